//! WordprocessingML reader
//!
//! Streams `word/styles.xml` and `word/document.xml` out of the ZIP container
//! with quick-xml. Only direct properties are recorded; inheritance through
//! the style chain is resolved later by the extractor.

use super::{
    normalize_style_name, SourceDocument, SourceParagraph, SourceRun, SourceStyle, SourceTable,
    StyleKind,
};
use crate::error::{DocError, Result};
use crate::format::{
    twips_to_points, Alignment, PageGeometry, ParagraphFormat, Rgb, RunFormat, AUTO_LINE_UNIT,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Read a `.docx` file into a [`SourceDocument`]
pub fn read_docx<P: AsRef<Path>>(path: P) -> Result<SourceDocument> {
    let path = path.as_ref();
    let corrupt = |reason: String| DocError::CorruptDocument {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|source| DocError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| corrupt(format!("not a ZIP container: {e}")))?;

    let document_xml = read_entry(&mut archive, "word/document.xml")
        .map_err(corrupt)?
        .ok_or_else(|| corrupt("missing word/document.xml".to_string()))?;
    let styles_xml = read_entry(&mut archive, "word/styles.xml").map_err(corrupt)?;

    let styles = match styles_xml {
        Some(xml) => parse_styles(&xml).map_err(corrupt)?,
        None => {
            log::warn!("{} has no style sheet", path.display());
            Vec::new()
        }
    };
    let mut document = parse_document(&document_xml).map_err(corrupt)?;
    document.styles = styles;

    log::info!(
        "Read {}: {} paragraphs, {} tables, {} styles",
        path.display(),
        document.paragraphs.len(),
        document.tables.len(),
        document.styles.len()
    );
    Ok(document)
}

fn read_entry(
    archive: &mut ZipArchive<File>,
    name: &str,
) -> std::result::Result<Option<String>, String> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(format!("cannot open {name}: {e}")),
    };
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| format!("cannot read {name}: {e}"))?;
    Ok(Some(content))
}

/// Extract an attribute value by qualified name
fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(std::result::Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn get_attr_f64(e: &BytesStart, key: &[u8]) -> Option<f64> {
    get_attr(e, key).and_then(|s| s.trim().parse().ok())
}

/// Toggle properties (`w:b`, `w:i`) are on unless `w:val` says otherwise
fn toggle_value(e: &BytesStart) -> bool {
    !matches!(
        get_attr(e, b"w:val").as_deref(),
        Some("0" | "false" | "off")
    )
}

/// Apply one child of `w:pPr` to a paragraph format
fn apply_paragraph_property(e: &BytesStart, format: &mut ParagraphFormat) {
    match e.name().as_ref() {
        b"w:jc" => {
            if let Some(value) = get_attr(e, b"w:val") {
                format.alignment = Alignment::from_ooxml(&value).or(format.alignment);
            }
        }
        b"w:spacing" => {
            if let Some(before) = get_attr_f64(e, b"w:before") {
                format.space_before = Some(twips_to_points(before));
            }
            if let Some(after) = get_attr_f64(e, b"w:after") {
                format.space_after = Some(twips_to_points(after));
            }
            if let Some(line) = get_attr_f64(e, b"w:line") {
                match get_attr(e, b"w:lineRule").as_deref() {
                    Some("exact" | "atLeast") => format.line_height = Some(twips_to_points(line)),
                    _ => format.line_spacing = Some(line / AUTO_LINE_UNIT),
                }
            }
        }
        b"w:ind" => {
            if let Some(left) = get_attr_f64(e, b"w:left").or_else(|| get_attr_f64(e, b"w:start"))
            {
                format.left_indent = Some(twips_to_points(left));
            }
            if let Some(right) = get_attr_f64(e, b"w:right").or_else(|| get_attr_f64(e, b"w:end"))
            {
                format.right_indent = Some(twips_to_points(right));
            }
            if let Some(first) = get_attr_f64(e, b"w:firstLine") {
                format.first_line_indent = Some(twips_to_points(first));
            } else if let Some(hanging) = get_attr_f64(e, b"w:hanging") {
                format.first_line_indent = Some(-twips_to_points(hanging));
            }
        }
        _ => {}
    }
}

/// Apply one child of `w:rPr` to a run format
fn apply_run_property(e: &BytesStart, format: &mut RunFormat) {
    match e.name().as_ref() {
        b"w:rFonts" => {
            let name = get_attr(e, b"w:ascii")
                .or_else(|| get_attr(e, b"w:eastAsia"))
                .or_else(|| get_attr(e, b"w:hAnsi"));
            if name.is_some() {
                format.font_name = name;
            }
        }
        b"w:sz" => {
            if let Some(half_points) = get_attr_f64(e, b"w:val") {
                format.font_size = Some(half_points / 2.0);
            }
        }
        b"w:b" => format.bold = Some(toggle_value(e)),
        b"w:i" => format.italic = Some(toggle_value(e)),
        b"w:u" => {
            format.underline = Some(!matches!(get_attr(e, b"w:val").as_deref(), Some("none")));
        }
        b"w:color" => {
            if let Some(value) = get_attr(e, b"w:val") {
                format.color = Rgb::from_hex(&value);
            }
        }
        _ => {}
    }
}

/// Style sheet parse state
#[derive(Default)]
struct StyleBuilder {
    current: Option<SourceStyle>,
    in_ppr: bool,
    in_rpr: bool,
}

impl StyleBuilder {
    fn start_style(&mut self, e: &BytesStart) {
        let id = get_attr(e, b"w:styleId").unwrap_or_default();
        let kind = StyleKind::from_ooxml(get_attr(e, b"w:type").as_deref());
        self.current = Some(SourceStyle {
            name: id.clone(),
            id,
            kind,
            based_on: None,
            paragraph: ParagraphFormat::default(),
            run: RunFormat::default(),
        });
    }

    fn element(&mut self, e: &BytesStart) {
        let Some(style) = self.current.as_mut() else {
            return;
        };
        match e.name().as_ref() {
            b"w:name" => {
                if let Some(name) = get_attr(e, b"w:val") {
                    style.name = normalize_style_name(&name);
                }
            }
            b"w:basedOn" => style.based_on = get_attr(e, b"w:val"),
            _ if self.in_ppr => apply_paragraph_property(e, &mut style.paragraph),
            _ if self.in_rpr => apply_run_property(e, &mut style.run),
            _ => {}
        }
    }
}

fn parse_styles(xml: &str) -> std::result::Result<Vec<SourceStyle>, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut styles = Vec::new();
    let mut state = StyleBuilder::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:style" => state.start_style(e),
                b"w:pPr" => state.in_ppr = true,
                b"w:rPr" => state.in_rpr = true,
                _ => state.element(e),
            },
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"w:style" {
                    state.start_style(e);
                    styles.extend(state.current.take());
                } else {
                    state.element(e);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:style" => styles.extend(state.current.take()),
                b"w:pPr" => state.in_ppr = false,
                b"w:rPr" => state.in_rpr = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed styles.xml at {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(styles)
}

/// Document body parse state
#[derive(Default)]
struct BodyBuilder {
    document: SourceDocument,
    paragraph: Option<SourceParagraph>,
    run: Option<SourceRun>,
    in_ppr: bool,
    in_rpr: bool,
    in_text: bool,
    in_section: bool,
    /// Nesting depth of `w:tbl`; body paragraphs are only collected at depth 0
    table_depth: usize,
    /// Nesting depth of text boxes, whose paragraphs are skipped
    textbox_depth: usize,
    table: SourceTable,
    row: Vec<String>,
    cell: Option<String>,
    section: Option<PageGeometry>,
}

impl BodyBuilder {
    fn in_body_paragraph(&self) -> bool {
        self.table_depth == 0 && self.textbox_depth == 0
    }

    fn start(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = SourceTable::default();
                }
            }
            b"w:tr" if self.table_depth == 1 => self.row.clear(),
            b"w:tc" if self.table_depth == 1 => self.cell = Some(String::new()),
            b"w:txbxContent" => self.textbox_depth += 1,
            b"w:p" if self.in_body_paragraph() => {
                self.paragraph = Some(SourceParagraph::default());
            }
            b"w:p" => {
                if let Some(cell) = self.cell.as_mut().filter(|c| !c.is_empty()) {
                    cell.push('\n');
                }
            }
            b"w:pPr" => self.in_ppr = true,
            b"w:rPr" => self.in_rpr = true,
            b"w:r" if self.paragraph.is_some() => self.run = Some(SourceRun::default()),
            b"w:t" => self.in_text = true,
            b"w:sectPr" => self.in_section = self.document.page.is_none(),
            _ => self.property(e),
        }
    }

    fn empty(&mut self, e: &BytesStart) {
        match e.name().as_ref() {
            b"w:p" if self.in_body_paragraph() => {
                self.document.paragraphs.push(SourceParagraph::default());
            }
            // w:tab inside w:pPr is a tab stop definition, not a character.
            b"w:tab" if !self.in_ppr => self.push_text("\t"),
            b"w:br" | b"w:cr" if !self.in_ppr => self.push_text("\n"),
            _ => self.property(e),
        }
    }

    /// Property elements that may appear as either start or empty tags
    fn property(&mut self, e: &BytesStart) {
        if self.in_section {
            self.section_property(e);
            return;
        }
        if self.in_rpr {
            // Paragraph-mark run properties inside w:pPr have no run to apply to.
            if let Some(run) = self.run.as_mut() {
                apply_run_property(e, &mut run.format);
            }
            return;
        }
        if self.in_ppr {
            if let Some(paragraph) = self.paragraph.as_mut() {
                if e.name().as_ref() == b"w:pStyle" {
                    paragraph.style_id = get_attr(e, b"w:val");
                } else {
                    apply_paragraph_property(e, &mut paragraph.format);
                }
            }
        }
    }

    fn section_property(&mut self, e: &BytesStart) {
        let page = self.section.get_or_insert_with(PageGeometry::default);
        let twips = |key: &[u8]| get_attr_f64(e, key).map(twips_to_points);
        match e.name().as_ref() {
            b"w:pgSz" => {
                page.page_width = twips(b"w:w").unwrap_or(page.page_width);
                page.page_height = twips(b"w:h").unwrap_or(page.page_height);
            }
            b"w:pgMar" => {
                page.top_margin = twips(b"w:top").unwrap_or(page.top_margin);
                page.bottom_margin = twips(b"w:bottom").unwrap_or(page.bottom_margin);
                page.left_margin = twips(b"w:left").unwrap_or(page.left_margin);
                page.right_margin = twips(b"w:right").unwrap_or(page.right_margin);
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        } else if let Some(cell) = self.cell.as_mut() {
            cell.push_str(text);
        }
    }

    fn text(&mut self, text: &str) {
        if !self.in_text {
            return;
        }
        if self.in_body_paragraph() {
            self.push_text(text);
        } else if let Some(cell) = self.cell.as_mut() {
            cell.push_str(text);
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"w:t" => self.in_text = false,
            b"w:pPr" => self.in_ppr = false,
            b"w:rPr" => self.in_rpr = false,
            b"w:r" => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.runs.push(run);
                }
            }
            b"w:p" if self.in_body_paragraph() => {
                if let Some(paragraph) = self.paragraph.take() {
                    self.document.paragraphs.push(paragraph);
                }
            }
            b"w:tc" if self.table_depth == 1 => {
                if let Some(cell) = self.cell.take() {
                    self.row.push(cell);
                }
            }
            b"w:tr" if self.table_depth == 1 => {
                let row = std::mem::take(&mut self.row);
                self.table.rows.push(row);
            }
            b"w:tbl" => {
                if self.table_depth == 1 {
                    let table = std::mem::take(&mut self.table);
                    self.document.tables.push(table);
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            b"w:txbxContent" => self.textbox_depth = self.textbox_depth.saturating_sub(1),
            b"w:sectPr" => {
                if self.in_section {
                    self.document.page = self.section.take().or(Some(PageGeometry::default()));
                }
                self.in_section = false;
            }
            _ => {}
        }
    }
}

fn parse_document(xml: &str) -> std::result::Result<SourceDocument, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut state = BodyBuilder::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => state.start(e),
            Ok(Event::Empty(ref e)) => state.empty(e),
            Ok(Event::Text(ref t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| format!("bad text at {}: {e}", reader.buffer_position()))?;
                state.text(&text);
            }
            Ok(Event::End(ref e)) => state.end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed document.xml at {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(state.document)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:rPr><w:rFonts w:ascii="宋体" w:eastAsia="宋体"/><w:sz w:val="24"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:pPr><w:jc w:val="center"/><w:spacing w:before="240" w:after="360"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="44"/><w:color w:val="333333"/></w:rPr>
  </w:style>
  <w:style w:type="character" w:styleId="Strong">
    <w:name w:val="Strong"/>
    <w:rPr><w:b/></w:rPr>
  </w:style>
</w:styles>"#;

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:pPr><w:pStyle w:val="Heading1"/><w:rPr><w:i/></w:rPr></w:pPr>
      <w:r><w:rPr><w:b w:val="0"/></w:rPr><w:t>项目概况</w:t></w:r>
    </w:p>
    <w:p>
      <w:pPr><w:spacing w:line="360" w:lineRule="auto"/><w:ind w:firstLine="480"/></w:pPr>
      <w:r><w:t xml:space="preserve">名称： </w:t></w:r>
      <w:r><w:rPr><w:u w:val="single"/></w:rPr><w:t>___</w:t></w:r>
      <w:r><w:tab/><w:t>&amp;end</w:t></w:r>
    </w:p>
    <w:tbl>
      <w:tr>
        <w:tc><w:p><w:r><w:t>A</w:t></w:r></w:p></w:tc>
        <w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p><w:p><w:r><w:t>C</w:t></w:r></w:p></w:tc>
      </w:tr>
    </w:tbl>
    <w:p/>
    <w:sectPr>
      <w:pgSz w:w="11906" w:h="16838"/>
      <w:pgMar w:top="1440" w:bottom="1440" w:left="1800" w:right="1800"/>
    </w:sectPr>
  </w:body>
</w:document>"#;

    #[test]
    fn test_parse_styles() {
        // Arrange / Act
        let styles = parse_styles(STYLES).unwrap();

        // Assert
        assert_eq!(styles.len(), 3);
        let heading = &styles[1];
        assert_eq!(heading.id, "Heading1");
        assert_eq!(heading.name, "Heading 1");
        assert_eq!(heading.based_on.as_deref(), Some("Normal"));
        assert_eq!(heading.paragraph.alignment, Some(Alignment::Center));
        assert_eq!(heading.paragraph.space_after, Some(18.0));
        assert_eq!(heading.run.font_size, Some(22.0));
        assert_eq!(heading.run.bold, Some(true));
        assert_eq!(heading.run.color, Some(Rgb(51, 51, 51)));
        assert_eq!(styles[0].run.font_name.as_deref(), Some("宋体"));
        assert_eq!(styles[2].kind, StyleKind::Character);
    }

    #[test]
    fn test_parse_document_paragraphs() {
        // Arrange / Act
        let doc = parse_document(DOCUMENT).unwrap();

        // Assert
        assert_eq!(doc.paragraphs.len(), 3);
        let heading = &doc.paragraphs[0];
        assert_eq!(heading.style_id.as_deref(), Some("Heading1"));
        assert_eq!(heading.text(), "项目概况");
        assert_eq!(heading.runs[0].format.bold, Some(false));
        assert_eq!(heading.runs[0].format.italic, None);

        let body = &doc.paragraphs[1];
        assert_eq!(body.text(), "名称： ___\t&end");
        assert_eq!(body.format.line_spacing, Some(1.5));
        assert_eq!(body.format.first_line_indent, Some(24.0));
        assert_eq!(body.runs[1].format.underline, Some(true));

        assert!(doc.paragraphs[2].runs.is_empty());
    }

    #[test]
    fn test_parse_document_tables_and_page() {
        // Arrange / Act
        let doc = parse_document(DOCUMENT).unwrap();

        // Assert
        assert_eq!(
            doc.tables,
            vec![SourceTable {
                rows: vec![vec!["A".to_string(), "B\nC".to_string()]]
            }]
        );
        let page = doc.page.unwrap();
        assert!((page.page_width - 595.3).abs() < 0.01);
        assert_eq!(page.left_margin, 90.0);
        assert_eq!(page.top_margin, 72.0);
    }

    #[test]
    fn test_read_rejects_non_zip() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, "not a zip").unwrap();

        // Act
        let err = read_docx(&path).unwrap_err();

        // Assert
        assert!(matches!(err, DocError::CorruptDocument { .. }));
    }
}
