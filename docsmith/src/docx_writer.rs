//! DOCX serialisation using the docx-rs library
//!
//! Converts a [`StyledDocument`] into a `docx_rs::Docx`. Lengths arrive in
//! points and are converted here: twips for page setup, spacing and indents,
//! half-points for font sizes.

use crate::builder::{
    PageNumberFooter, ParagraphStyleDef, RunningHeader, StyledCell, StyledDocument, StyledElement,
    StyledParagraph, StyledRun, StyledTable,
};
use crate::error::{DocError, Result};
use crate::format::{
    points_to_half_points, points_to_twips, Alignment, PageGeometry, ParagraphFormat, RunFormat,
    AUTO_LINE_UNIT,
};
use docx_rs::{
    AlignmentType, BreakType, Docx, FieldCharType, Footer, Header, InstrPAGE, InstrText,
    LineSpacing, LineSpacingType, PageMargin, Paragraph, Run, RunFonts, Shading,
    SpecialIndentType, Style, StyleType, Table, TableCell, TableRow,
};
use std::io::{Seek, Write};

/// Build the docx-rs document tree
pub fn to_docx(doc: &StyledDocument) -> Docx {
    log::info!(
        "Creating DOCX with docx-rs: {} elements, {} styles",
        doc.elements.len(),
        doc.paragraph_styles.len()
    );

    let mut docx = page_setup(Docx::new(), &doc.page);

    for style in &doc.paragraph_styles {
        docx = docx.add_style(create_style(style));
    }
    if let Some(header) = &doc.header {
        docx = docx.header(create_header(header));
    }
    if let Some(footer) = &doc.footer {
        docx = docx.footer(create_footer(footer));
    }

    for element in &doc.elements {
        docx = match element {
            StyledElement::Paragraph(p) => docx.add_paragraph(create_paragraph(p)),
            StyledElement::Table(t) => docx.add_table(create_table(t)),
        };
    }

    docx
}

/// Serialise `doc` into `writer` as a `.docx` package
pub fn write_docx<W: Write + Seek>(doc: &StyledDocument, writer: W) -> Result<()> {
    to_docx(doc)
        .build()
        .pack(writer)
        .map_err(|e| DocError::Write(format!("Failed to write DOCX: {}", e)))?;
    log::info!("Wrote DOCX with {} elements", doc.elements.len());
    Ok(())
}

fn page_setup(docx: Docx, page: &PageGeometry) -> Docx {
    let twips = |points: f64| points_to_twips(points).max(0) as u32;
    docx.page_size(twips(page.page_width), twips(page.page_height))
        .page_margin(
            PageMargin::new()
                .top(points_to_twips(page.top_margin))
                .bottom(points_to_twips(page.bottom_margin))
                .left(points_to_twips(page.left_margin))
                .right(points_to_twips(page.right_margin)),
        )
}

fn alignment_to_docx_alignment(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
        Alignment::Justify => AlignmentType::Both,
    }
}

/// Spacing element for a paragraph format, if it sets any spacing
fn create_line_spacing(format: &ParagraphFormat) -> Option<LineSpacing> {
    if format.space_before.is_none()
        && format.space_after.is_none()
        && format.line_spacing.is_none()
        && format.line_height.is_none()
    {
        return None;
    }

    let mut spacing = LineSpacing::new();
    if let Some(before) = format.space_before {
        spacing = spacing.before(points_to_twips(before).max(0) as u32);
    }
    if let Some(after) = format.space_after {
        spacing = spacing.after(points_to_twips(after).max(0) as u32);
    }
    // An exact height wins over a multiplier
    if let Some(height) = format.line_height {
        spacing = spacing
            .line(points_to_twips(height))
            .line_rule(LineSpacingType::Exact);
    } else if let Some(multiplier) = format.line_spacing {
        spacing = spacing
            .line((multiplier * AUTO_LINE_UNIT).round() as i32)
            .line_rule(LineSpacingType::Auto);
    }
    Some(spacing)
}

fn apply_paragraph_format(mut para: Paragraph, format: &ParagraphFormat) -> Paragraph {
    if let Some(alignment) = format.alignment {
        para = para.align(alignment_to_docx_alignment(alignment));
    }
    if let Some(spacing) = create_line_spacing(format) {
        para = para.line_spacing(spacing);
    }

    let left = format.left_indent.map(points_to_twips);
    let right = format.right_indent.map(points_to_twips);
    let special = format.first_line_indent.map(|indent| {
        let twips = points_to_twips(indent);
        if twips < 0 {
            SpecialIndentType::Hanging(-twips)
        } else {
            SpecialIndentType::FirstLine(twips)
        }
    });
    if left.is_some() || right.is_some() || special.is_some() {
        para = para.indent(left, special, right, None);
    }

    para
}

fn create_run_fonts(name: &str) -> RunFonts {
    RunFonts::new().ascii(name).hi_ansi(name).east_asia(name)
}

/// Create a docx Run from a StyledRun with its direct formatting
fn create_run(styled: &StyledRun) -> Run {
    let mut run = Run::new();
    if styled.break_before {
        run = run.add_break(BreakType::TextWrapping);
    }
    run = run.add_text(&styled.text);
    apply_run_format(run, &styled.format)
}

fn apply_run_format(mut run: Run, format: &RunFormat) -> Run {
    if let Some(name) = &format.font_name {
        run = run.fonts(create_run_fonts(name));
    }
    if let Some(size) = format.font_size {
        run = run.size(points_to_half_points(size));
    }
    if format.bold == Some(true) {
        run = run.bold();
    }
    if format.italic == Some(true) {
        run = run.italic();
    }
    if format.underline == Some(true) {
        run = run.underline("single");
    }
    if let Some(color) = format.color {
        run = run.color(color.to_hex());
    }
    run
}

fn create_paragraph(styled: &StyledParagraph) -> Paragraph {
    let mut para = Paragraph::new();
    if let Some(style_id) = &styled.style_id {
        para = para.style(style_id);
    }
    if let Some(heading) = styled.heading {
        // w:outlineLvl is zero based
        para = para.outline_lvl(heading.outline_level.saturating_sub(1));
    }
    para = apply_paragraph_format(para, &styled.format);

    if styled.runs.is_empty() {
        // Empty paragraphs still need one run
        return para.add_run(Run::new().add_text(""));
    }
    for run in &styled.runs {
        para = para.add_run(create_run(run));
    }
    para
}

fn create_table_cell(cell: &StyledCell) -> TableCell {
    let mut table_cell = TableCell::new().add_paragraph(create_paragraph(&cell.paragraph));
    if let Some(fill) = cell.shading {
        table_cell = table_cell.shading(Shading::new().fill(fill.to_hex()));
    }
    table_cell
}

fn create_table(table: &StyledTable) -> Table {
    let rows = table
        .rows
        .iter()
        .map(|row| TableRow::new(row.iter().map(create_table_cell).collect()))
        .collect();
    Table::new(rows)
}

fn create_style(def: &ParagraphStyleDef) -> Style {
    let mut style = Style::new(&def.id, StyleType::Paragraph).name(&def.name);

    let run = &def.run;
    if let Some(name) = &run.font_name {
        style = style.fonts(create_run_fonts(name));
    }
    if let Some(size) = run.font_size {
        style = style.size(points_to_half_points(size));
    }
    if run.bold == Some(true) {
        style = style.bold();
    }
    if run.italic == Some(true) {
        style = style.italic();
    }
    if let Some(color) = run.color {
        style = style.color(color.to_hex());
    }
    if let Some(alignment) = def.paragraph.alignment {
        style = style.align(alignment_to_docx_alignment(alignment));
    }
    if let Some(level) = def.outline_level {
        style = style.outline_lvl(level.saturating_sub(1));
    }

    style
}

fn create_header(header: &RunningHeader) -> Header {
    let para = Paragraph::new()
        .align(alignment_to_docx_alignment(header.alignment))
        .add_run(apply_run_format(
            Run::new().add_text(&header.text),
            &header.format,
        ));
    Header::new().add_paragraph(para)
}

/// Footer paragraph: prefix, a PAGE field, suffix
fn create_footer(footer: &PageNumberFooter) -> Footer {
    let text_run = |text: &str| apply_run_format(Run::new().add_text(text), &footer.format);
    let field = apply_run_format(
        Run::new()
            .add_field_char(FieldCharType::Begin, false)
            .add_instr_text(InstrText::PAGE(InstrPAGE::new()))
            .add_field_char(FieldCharType::Separate, false)
            .add_text("1")
            .add_field_char(FieldCharType::End, false),
        &footer.format,
    );

    let para = Paragraph::new()
        .align(alignment_to_docx_alignment(footer.alignment))
        .add_run(text_run(&footer.prefix))
        .add_run(field)
        .add_run(text_run(&footer.suffix));
    Footer::new().add_paragraph(para)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::HeadingInfo;
    use crate::format::Rgb;
    use std::io::{Cursor, Read};

    fn sample() -> StyledDocument {
        let mut doc = StyledDocument::new(PageGeometry::default().with_margins(1.25));
        doc.footer = Some(PageNumberFooter {
            prefix: "第 ".to_string(),
            suffix: " 页".to_string(),
            format: RunFormat::default(),
            alignment: Alignment::Center,
        });
        doc.push_paragraph(StyledParagraph {
            style_id: Some("Heading1".to_string()),
            heading: Some(HeadingInfo {
                level: 1,
                outline_level: 1,
            }),
            format: ParagraphFormat {
                alignment: Some(Alignment::Center),
                line_spacing: Some(1.5),
                ..Default::default()
            },
            runs: vec![StyledRun::new(
                "工程概况",
                RunFormat {
                    font_name: Some("黑体".to_string()),
                    font_size: Some(22.0),
                    color: Some(Rgb(0x33, 0x33, 0x33)),
                    ..Default::default()
                },
            )],
        });
        doc.push_table(StyledTable {
            rows: vec![vec![StyledCell {
                paragraph: StyledParagraph {
                    runs: vec![StyledRun::new("A", RunFormat::default())],
                    ..Default::default()
                },
                shading: Some(Rgb(0xD9, 0xE2, 0xF3)),
            }]],
        });
        doc
    }

    fn document_xml(bytes: Vec<u8>) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_write_docx_produces_zip_package() {
        // Arrange
        let doc = sample();
        let mut buffer = Cursor::new(Vec::new());

        // Act
        write_docx(&doc, &mut buffer).unwrap();

        // Assert
        let xml = document_xml(buffer.into_inner());
        assert!(xml.contains("工程概况"));
        assert!(xml.contains("D9E2F3"));
        assert!(xml.contains("333333"));
    }

    #[test]
    fn test_line_spacing_conversion() {
        let format = ParagraphFormat {
            space_before: Some(12.0),
            line_spacing: Some(1.5),
            ..Default::default()
        };
        assert!(create_line_spacing(&format).is_some());
        assert!(create_line_spacing(&ParagraphFormat::default()).is_none());
    }
}
