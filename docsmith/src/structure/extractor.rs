//! Structure extraction from a decoded Word document

use super::{
    detect_fields, Element, ElementKind, Statistics, StructureTemplate, StyleDefinition,
    TemplateMetadata, TEMPLATE_VERSION,
};
use crate::format::{ParagraphFormat, RunFormat};
use crate::reader::{SourceDocument, StyleKind};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

static OUTLINE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:第[一二三四五六七八九十百零\d]+[章节篇部条]\s*|[（(][一二三四五六七八九十\d]+[）)]\s*|[一二三四五六七八九十]+[、．.]\s*|\d+(?:\.\d+)*(?:[、．.]\s*|\s+))",
    )
    .expect("valid outline number regex")
});

/// Extraction tuning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Headings deeper than this are recorded as body paragraphs
    pub max_depth: Option<usize>,
    /// Strip leading outline numbers ("1.2", "一、", "第三章") from heading text
    pub clean_numbering: bool,
}

/// Extracted template plus non-fatal problems met on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub template: StructureTemplate,
    pub warnings: Vec<String>,
}

/// Heading level encoded in a style name, if the style is a heading style
///
/// Names containing "heading" (any case) or "标题" are headings. The level is
/// the trailing integer and defaults to 1.
pub fn heading_level(style_name: &str) -> Option<usize> {
    let lower = style_name.to_lowercase();
    if !lower.contains("heading") && !style_name.contains("标题") {
        return None;
    }
    let trimmed = style_name.trim_end();
    let digits_start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);
    let level = digits_start
        .and_then(|i| trimmed[i..].parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    Some(level)
}

fn clean_heading_text(text: &str) -> String {
    let cleaned = OUTLINE_NUMBER_RE.replace(text, "");
    if cleaned.trim().is_empty() {
        text.to_string()
    } else {
        cleaned.trim().to_string()
    }
}

/// Build a structure template from a decoded document
pub fn extract(
    document: &SourceDocument,
    source_name: &str,
    options: &ExtractOptions,
) -> Extraction {
    let mut warnings = Vec::new();
    let styles = resolve_styles(document, &mut warnings);

    let mut elements = Vec::new();
    for (index, paragraph) in document.paragraphs.iter().enumerate() {
        let raw = paragraph.text();
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }

        let style = document.style_name(paragraph.style_id.as_deref());
        let level = heading_level(&style)
            .filter(|level| options.max_depth.map_or(true, |max| *level <= max));

        let (kind, level, text) = match level {
            Some(level) if options.clean_numbering => {
                (ElementKind::Heading, level, clean_heading_text(text))
            }
            Some(level) => (ElementKind::Heading, level, text.to_string()),
            None => (ElementKind::Paragraph, 0, text.to_string()),
        };

        elements.push(Element {
            index,
            kind,
            level,
            fields: detect_fields(&text),
            text,
            style,
            format: paragraph.format.clone(),
            run_format: paragraph.runs.first().map(|r| r.format.clone()),
        });
    }

    let mut template = StructureTemplate {
        metadata: TemplateMetadata {
            source_document: source_name.to_string(),
            version: TEMPLATE_VERSION.to_string(),
        },
        page_settings: document.page.unwrap_or_default(),
        styles,
        document_structure: elements,
        statistics: Statistics {
            total_paragraphs: document.paragraphs.len(),
            ..Default::default()
        },
    };
    template.refresh_statistics();

    log::info!(
        "Extracted {} elements, {} sections, {} fields",
        template.document_structure.len(),
        template.statistics.total_sections,
        template.statistics.total_fields
    );
    Extraction { template, warnings }
}

/// Resolve every paragraph style through its `basedOn` chain
///
/// A style whose chain is broken (missing parent or a cycle) is skipped with
/// a warning.
fn resolve_styles(
    document: &SourceDocument,
    warnings: &mut Vec<String>,
) -> BTreeMap<String, StyleDefinition> {
    let mut resolved = BTreeMap::new();

    for style in document
        .styles
        .iter()
        .filter(|s| s.kind == StyleKind::Paragraph)
    {
        match resolve_chain(document, &style.id) {
            Ok((paragraph_format, font)) => {
                let based_on = style
                    .based_on
                    .as_deref()
                    .and_then(|id| document.style(id))
                    .map(|parent| parent.name.clone());
                resolved.insert(
                    style.name.clone(),
                    StyleDefinition {
                        id: style.id.clone(),
                        name: style.name.clone(),
                        based_on,
                        paragraph_format,
                        font,
                    },
                );
            }
            Err(reason) => {
                let warning = format!("Style '{}' skipped: {}", style.name, reason);
                log::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    resolved
}

fn resolve_chain(
    document: &SourceDocument,
    id: &str,
) -> Result<(ParagraphFormat, RunFormat), String> {
    let mut paragraph = ParagraphFormat::default();
    let mut run = RunFormat::default();
    let mut seen = HashSet::new();
    let mut next = Some(id.to_string());

    while let Some(current) = next {
        if !seen.insert(current.clone()) {
            return Err(format!("basedOn cycle through '{current}'"));
        }
        let style = document
            .style(&current)
            .ok_or_else(|| format!("base style '{current}' is missing"))?;
        paragraph = paragraph.or(&style.paragraph);
        run = run.or(&style.run);
        next = style.based_on.clone();
    }

    Ok((paragraph, run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Alignment, PageGeometry};
    use crate::reader::{SourceParagraph, SourceRun, SourceStyle};

    fn style(id: &str, name: &str, based_on: Option<&str>, size: Option<f64>) -> SourceStyle {
        SourceStyle {
            id: id.to_string(),
            name: name.to_string(),
            kind: StyleKind::Paragraph,
            based_on: based_on.map(str::to_string),
            paragraph: ParagraphFormat::default(),
            run: RunFormat {
                font_size: size,
                ..Default::default()
            },
        }
    }

    fn paragraph(style_id: Option<&str>, text: &str) -> SourceParagraph {
        SourceParagraph {
            style_id: style_id.map(str::to_string),
            format: ParagraphFormat::default(),
            runs: vec![SourceRun {
                text: text.to_string(),
                format: RunFormat::default(),
            }],
        }
    }

    fn sample() -> SourceDocument {
        let mut normal = style("Normal", "Normal", None, Some(12.0));
        normal.run.font_name = Some("宋体".to_string());
        let mut heading1 = style("Heading1", "Heading 1", Some("Normal"), Some(22.0));
        heading1.paragraph.alignment = Some(Alignment::Center);

        SourceDocument {
            page: Some(PageGeometry::default().with_margins(1.25)),
            styles: vec![
                normal,
                heading1,
                style("Heading2", "Heading 2", Some("Normal"), Some(16.0)),
                style("Broken", "Broken", Some("Ghost"), None),
                style("LoopA", "LoopA", Some("LoopB"), None),
                style("LoopB", "LoopB", Some("LoopA"), None),
            ],
            paragraphs: vec![
                paragraph(Some("Heading1"), "1. 工程概况"),
                paragraph(None, "项目名称：[项目名称]"),
                paragraph(None, "   "),
                paragraph(Some("Heading2"), "1.1 基本信息"),
                paragraph(None, "地点：___"),
            ],
            tables: Vec::new(),
        }
    }

    #[test]
    fn test_heading_level_from_style_name() {
        assert_eq!(heading_level("Heading 1"), Some(1));
        assert_eq!(heading_level("heading 3"), Some(3));
        assert_eq!(heading_level("标题 2"), Some(2));
        assert_eq!(heading_level("标题"), Some(1));
        assert_eq!(heading_level("Heading X"), Some(1));
        assert_eq!(heading_level("Normal"), None);
        assert_eq!(heading_level("Title"), None);
    }

    #[test]
    fn test_extract_elements_and_tree() {
        // Arrange
        let doc = sample();

        // Act
        let Extraction { template, .. } = extract(&doc, "ref.docx", &ExtractOptions::default());

        // Assert
        let elements = &template.document_structure;
        assert_eq!(elements.len(), 4);
        assert_eq!(elements[0].kind, ElementKind::Heading);
        assert_eq!(elements[0].text, "1. 工程概况");
        assert_eq!(elements[1].style, "Normal");
        assert_eq!(elements[1].fields.len(), 1);
        assert_eq!(elements[2].index, 3, "index keeps the source position");

        let sections = template.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].subsections[0].paragraphs[0].text, "地点：___");
        assert_eq!(template.statistics.total_paragraphs, 5);
        assert_eq!(template.page_settings.left_margin, 90.0);
    }

    #[test]
    fn test_broken_styles_become_warnings() {
        // Arrange
        let doc = sample();

        // Act
        let extraction = extract(&doc, "ref.docx", &ExtractOptions::default());

        // Assert
        assert_eq!(extraction.warnings.len(), 3);
        assert!(extraction.template.style("Broken").is_none());
        let h1 = extraction.template.style("Heading 1").unwrap();
        assert_eq!(h1.font.font_size, Some(22.0));
        assert_eq!(h1.font.font_name.as_deref(), Some("宋体"));
        assert_eq!(h1.based_on.as_deref(), Some("Normal"));
        assert_eq!(h1.paragraph_format.alignment, Some(Alignment::Center));
    }

    #[test]
    fn test_max_depth_and_clean_numbering() {
        // Arrange
        let doc = sample();
        let options = ExtractOptions {
            max_depth: Some(1),
            clean_numbering: true,
        };

        // Act
        let template = extract(&doc, "ref.docx", &options).template;

        // Assert
        let elements = &template.document_structure;
        assert_eq!(elements[0].text, "工程概况");
        assert_eq!(elements[2].kind, ElementKind::Paragraph);
        assert_eq!(elements[2].text, "1.1 基本信息");
    }

    #[test]
    fn test_clean_heading_text_variants() {
        assert_eq!(clean_heading_text("第三章 施工组织"), "施工组织");
        assert_eq!(clean_heading_text("（一）质量目标"), "质量目标");
        assert_eq!(clean_heading_text("二、进度"), "进度");
        assert_eq!(clean_heading_text("2024年总结"), "2024年总结");
        assert_eq!(clean_heading_text("1.1 基本信息"), "基本信息");
        assert_eq!(clean_heading_text("3"), "3");
    }
}
