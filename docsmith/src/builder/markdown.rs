//! Markdown blocks rendered with a named style template

use super::apply::{apply_rule, image_placeholder, styled_paragraph, AppliedStyle};
use super::styled::{
    HeadingInfo, PageNumberFooter, ParagraphStyleDef, RunningHeader, StyledCell, StyledDocument,
    StyledElement, StyledParagraph, StyledRun, StyledTable,
};
use super::{BuildReport, NodeError};
use crate::format::{Alignment, PageGeometry, RunFormat};
use crate::markdown::{BlockKind, BlockNode};
use crate::styles::{resolve_color, StyleRule, StyleTemplate};

/// Deepest heading level exposed as a document outline level
pub const MAX_OUTLINE_LEVEL: usize = 3;

const HEADER_FONT_SIZE: f64 = 10.0;
const RULE_WIDTH: usize = 60;

/// Page decorations applied once, before any content
#[derive(Debug, Clone, PartialEq)]
pub struct Decorations {
    pub margin_inches: f64,
    /// Running header text, usually "{project} - {report type}"
    pub header: Option<String>,
    /// Page number prefix and suffix, e.g. ("第 ", " 页")
    pub page_numbers: Option<(String, String)>,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            margin_inches: 1.0,
            header: None,
            page_numbers: None,
        }
    }
}

/// Render `nodes` in order using `template`
pub fn build_markdown(
    nodes: &[BlockNode],
    template: &StyleTemplate,
    decorations: &Decorations,
) -> BuildReport {
    let page = PageGeometry::default().with_margins(decorations.margin_inches);
    let mut document = StyledDocument::new(page);
    decorate(&mut document, template, decorations);

    let mut warnings = Vec::new();
    register_heading_styles(&mut document, template, &mut warnings);
    for (i, node) in nodes.iter().enumerate() {
        match render_node(node, template, &mut warnings) {
            Ok(elements) => document.elements.extend(elements),
            Err(e) => {
                let warning = format!("Block {} ({}) skipped: {}", i + 1, node.type_name(), e);
                log::warn!("{}", warning);
                warnings.push(warning);
            }
        }
    }

    log::info!(
        "Built {} elements from {} blocks with template '{}'",
        document.elements.len(),
        nodes.len(),
        template.name
    );
    BuildReport {
        document,
        warnings,
        nodes_processed: nodes.len(),
    }
}

fn decorate(document: &mut StyledDocument, template: &StyleTemplate, decorations: &Decorations) {
    let format = RunFormat {
        font_name: template.body.font_name.clone(),
        font_size: Some(HEADER_FONT_SIZE),
        color: Some(resolve_color("secondary")),
        ..Default::default()
    };
    if let Some(text) = &decorations.header {
        document.header = Some(RunningHeader {
            text: text.clone(),
            format: format.clone(),
            alignment: Alignment::Center,
        });
    }
    if let Some((prefix, suffix)) = &decorations.page_numbers {
        document.footer = Some(PageNumberFooter {
            prefix: prefix.clone(),
            suffix: suffix.clone(),
            format: RunFormat {
                color: None,
                ..format
            },
            alignment: Alignment::Center,
        });
    }
}

/// Outline heading styles, so Word's navigation pane sees the headings
fn register_heading_styles(
    document: &mut StyledDocument,
    template: &StyleTemplate,
    warnings: &mut Vec<String>,
) {
    for level in 1..=MAX_OUTLINE_LEVEL {
        let applied = match apply_rule(template.heading(level), "heading") {
            Ok(applied) => applied,
            Err(e) => {
                let warning = format!("Heading {level} style left unformatted: {e}");
                log::warn!("{}", warning);
                warnings.push(warning);
                AppliedStyle::default()
            }
        };
        document.register_style(ParagraphStyleDef {
            id: heading_style_id(level),
            name: format!("Heading {level}"),
            paragraph: applied.paragraph,
            run: applied.run,
            outline_level: Some(level),
        });
    }
}

fn heading_style_id(level: usize) -> String {
    format!("Heading{}", level.clamp(1, MAX_OUTLINE_LEVEL))
}

fn render_node(
    node: &BlockNode,
    template: &StyleTemplate,
    warnings: &mut Vec<String>,
) -> Result<Vec<StyledElement>, NodeError> {
    let paragraph = |p: StyledParagraph| vec![StyledElement::Paragraph(p)];

    match node {
        BlockNode::Heading { level, text } => {
            let outline_level = (*level).clamp(1, MAX_OUTLINE_LEVEL);
            let rule = template.rule(BlockKind::Heading(*level));
            let mut p = styled_paragraph(text.as_str(), rule, &format!("heading {level}"))?;
            p.style_id = Some(heading_style_id(outline_level));
            p.heading = Some(HeadingInfo {
                level: *level,
                outline_level,
            });
            Ok(paragraph(p))
        }
        BlockNode::Paragraph { text } => Ok(paragraph(styled_paragraph(
            text.as_str(),
            template.rule(BlockKind::Body),
            "body",
        )?)),
        BlockNode::Table { headers, rows } => {
            Ok(vec![StyledElement::Table(render_table(headers, rows, template)?)])
        }
        BlockNode::List { ordered, items } => {
            let rule = template.rule(BlockKind::List);
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let text = if *ordered {
                        format!("{}. {}", i + 1, item)
                    } else {
                        format!("• {item}")
                    };
                    styled_paragraph(text, rule, "list").map(StyledElement::Paragraph)
                })
                .collect()
        }
        BlockNode::Quote { text } => Ok(paragraph(styled_paragraph(
            text.as_str(),
            template.rule(BlockKind::Quote),
            "quote",
        )?)),
        BlockNode::Code { language, text } => {
            let mut elements = Vec::new();
            if let Some(language) = language {
                let label =
                    styled_paragraph(format!("[{language}]"), &StyleRule::code_label(), "code label")?;
                elements.push(StyledElement::Paragraph(label));
            }
            let applied = apply_rule(template.rule(BlockKind::Code), "code")?;
            let runs = text
                .split('\n')
                .enumerate()
                .map(|(i, line)| {
                    let run = StyledRun::new(line, applied.run.clone());
                    if i == 0 {
                        run
                    } else {
                        run.on_new_line()
                    }
                })
                .collect();
            elements.push(StyledElement::Paragraph(StyledParagraph {
                format: applied.paragraph,
                runs,
                ..Default::default()
            }));
            Ok(elements)
        }
        BlockNode::Image { alt, url, .. } => {
            let p = image_placeholder(alt, url)?;
            let warning = format!("Image '{alt}' rendered as a placeholder; images are not embedded");
            log::warn!("{}", warning);
            warnings.push(warning);
            Ok(paragraph(p))
        }
        BlockNode::Rule => Ok(paragraph(styled_paragraph(
            "_".repeat(RULE_WIDTH),
            &StyleRule::horizontal_rule(),
            "horizontal rule",
        )?)),
    }
}

/// Grid of `rows + 1` rows by `headers` columns; short rows are padded with
/// empty cells and surplus cells are dropped.
fn render_table(
    headers: &[String],
    rows: &[Vec<String>],
    template: &StyleTemplate,
) -> Result<StyledTable, NodeError> {
    if headers.is_empty() {
        return Err(NodeError::EmptyTable);
    }
    let header_style = apply_rule(template.rule(BlockKind::TableHeader), "table header")?;
    let cell_style = apply_rule(template.rule(BlockKind::TableCell), "table cell")?;

    let cell = |text: &str, style: &AppliedStyle| StyledCell {
        paragraph: StyledParagraph {
            format: style.paragraph.clone(),
            runs: vec![StyledRun::new(text, style.run.clone())],
            ..Default::default()
        },
        shading: style.shading,
    };

    let mut grid: Vec<Vec<StyledCell>> = Vec::with_capacity(rows.len() + 1);
    grid.push(headers.iter().map(|h| cell(h, &header_style)).collect());
    for row in rows {
        grid.push(
            (0..headers.len())
                .map(|col| cell(row.get(col).map_or("", String::as_str), &cell_style))
                .collect(),
        );
    }

    Ok(StyledTable { rows: grid })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse;
    use crate::styles::StyleRegistry;

    fn template() -> StyleTemplate {
        StyleRegistry::builtin()
            .unwrap()
            .get_template("project_summary")
            .unwrap()
            .clone()
    }

    #[test]
    fn test_heading_level_is_clamped_for_outline_only() {
        // Arrange
        let nodes = parse("##### Deep heading");

        // Act
        let report = build_markdown(&nodes, &template(), &Decorations::default());

        // Assert
        let heading = report.document.headings().next().unwrap();
        assert_eq!(
            heading.heading,
            Some(HeadingInfo {
                level: 5,
                outline_level: 3
            })
        );
        assert_eq!(heading.style_id.as_deref(), Some("Heading3"));
        assert_eq!(heading.runs[0].format.font_size, Some(12.0), "h5 visual size");
    }

    #[test]
    fn test_short_row_is_padded() {
        // Arrange
        let nodes = parse("|A|B|\n|--|--|\n|1|");

        // Act
        let report = build_markdown(&nodes, &template(), &Decorations::default());

        // Assert
        let StyledElement::Table(table) = &report.document.elements[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows[1][0].paragraph.text(), "1");
        assert_eq!(table.rows[1][1].paragraph.text(), "");
        assert!(table.rows[0][0].shading.is_some());
        assert!(table.rows[1][0].shading.is_none());
    }

    #[test]
    fn test_long_row_is_truncated() {
        let nodes = vec![BlockNode::Table {
            headers: vec!["A".to_string()],
            rows: vec![vec!["1".to_string(), "2".to_string()]],
        }];
        let report = build_markdown(&nodes, &template(), &Decorations::default());
        let StyledElement::Table(table) = &report.document.elements[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.rows[1].len(), 1);
    }

    #[test]
    fn test_image_always_warns_but_succeeds() {
        // Arrange
        let nodes = parse("# T\n\n![现场](site.png)\n\ntext");

        // Act
        let report = build_markdown(&nodes, &template(), &Decorations::default());

        // Assert
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.nodes_processed, 3);
        let placeholder = report.document.paragraphs().nth(1).unwrap();
        assert_eq!(placeholder.text(), "[图片: 现场]\n(路径: site.png)");
        assert_eq!(placeholder.runs[0].format.italic, Some(true));
    }

    #[test]
    fn test_bad_node_becomes_warning_and_build_continues() {
        // Arrange
        let mut template = template();
        template.quote.font_size = Some(-1.0);
        let nodes = parse("> broken\n\nafter");

        // Act
        let report = build_markdown(&nodes, &template, &Decorations::default());

        // Assert
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("quote"));
        assert_eq!(report.document.elements.len(), 1);
    }

    #[test]
    fn test_invalid_heading_rule_warns_and_keeps_outline_style() {
        // Arrange
        let mut template = template();
        if let Some(h2) = template.h2.as_mut() {
            h2.font_size = Some(-1.0);
        }
        let nodes = parse("plain text");

        // Act
        let report = build_markdown(&nodes, &template, &Decorations::default());

        // Assert
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Heading 2 style"));
        let heading2 = report
            .document
            .paragraph_styles
            .iter()
            .find(|s| s.id == "Heading2")
            .unwrap();
        assert_eq!(heading2.outline_level, Some(2));
        assert_eq!(heading2.run.font_size, None);
    }

    #[test]
    fn test_table_without_headers_is_skipped() {
        let nodes = vec![BlockNode::Table {
            headers: Vec::new(),
            rows: Vec::new(),
        }];
        let report = build_markdown(&nodes, &template(), &Decorations::default());
        assert!(report.document.elements.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_lists_and_code() {
        // Arrange
        let nodes = parse("1. one\n2. two\n\n- x\n\n```sql\nselect 1;\nselect 2;\n```");

        // Act
        let report = build_markdown(&nodes, &template(), &Decorations::default());

        // Assert
        let texts: Vec<String> = report.document.paragraphs().map(|p| p.text()).collect();
        assert_eq!(
            texts,
            vec!["1. one", "2. two", "• x", "[sql]", "select 1;\nselect 2;"]
        );
    }

    #[test]
    fn test_decorations() {
        // Arrange
        let decorations = Decorations {
            margin_inches: 1.0,
            header: Some("城南项目 - 月报".to_string()),
            page_numbers: Some(("第 ".to_string(), " 页".to_string())),
        };

        // Act
        let report = build_markdown(&[], &template(), &decorations);

        // Assert
        let doc = &report.document;
        assert_eq!(doc.page.left_margin, 72.0);
        assert_eq!(doc.header.as_ref().unwrap().text, "城南项目 - 月报");
        assert_eq!(doc.footer.as_ref().unwrap().prefix, "第 ");
        assert_eq!(doc.paragraph_styles.len(), MAX_OUTLINE_LEVEL);
    }
}
