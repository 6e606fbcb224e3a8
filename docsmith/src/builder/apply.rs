//! Conversion of style rules into concrete formats

use super::styled::{StyledParagraph, StyledRun};
use super::NodeError;
use crate::format::{ParagraphFormat, Rgb, RunFormat, POINTS_PER_INCH};
use crate::styles::{resolve_color, StyleRule};

/// Formats produced by one style rule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedStyle {
    pub paragraph: ParagraphFormat,
    pub run: RunFormat,
    pub shading: Option<Rgb>,
}

/// Validate `rule` and resolve its colours and units
///
/// `target` names the block type in the error.
pub fn apply_rule(rule: &StyleRule, target: &str) -> Result<AppliedStyle, NodeError> {
    rule.validate().map_err(|reason| NodeError::InvalidRule {
        target: target.to_string(),
        reason,
    })?;

    let paragraph = ParagraphFormat {
        alignment: rule.alignment,
        line_spacing: rule.line_spacing,
        space_before: rule.space_before,
        space_after: rule.space_after,
        left_indent: rule.left_indent.map(|inches| inches * POINTS_PER_INCH),
        first_line_indent: rule.first_line_indent.map(|inches| inches * POINTS_PER_INCH),
        ..Default::default()
    };
    let run = RunFormat {
        font_name: rule.font_name.clone(),
        font_size: rule.font_size,
        bold: rule.bold,
        italic: rule.italic,
        underline: None,
        color: rule.color.as_deref().map(resolve_color),
    };
    let shading = rule.background.as_deref().map(resolve_color);

    Ok(AppliedStyle {
        paragraph,
        run,
        shading,
    })
}

/// Single-run paragraph styled by `rule`
pub fn styled_paragraph(
    text: impl Into<String>,
    rule: &StyleRule,
    target: &str,
) -> Result<StyledParagraph, NodeError> {
    let applied = apply_rule(rule, target)?;
    Ok(StyledParagraph {
        style_id: None,
        heading: None,
        format: applied.paragraph,
        runs: vec![StyledRun::new(text, applied.run)],
    })
}

/// Muted placeholder standing in for an image, with its source on a second line
pub fn image_placeholder(alt: &str, source: &str) -> Result<StyledParagraph, NodeError> {
    let mut paragraph = styled_paragraph(
        format!("[图片: {alt}]"),
        &StyleRule::image_placeholder(),
        "image placeholder",
    )?;
    if !source.is_empty() {
        let applied = apply_rule(&StyleRule::image_source(), "image source")?;
        paragraph
            .runs
            .push(StyledRun::new(format!("(路径: {source})"), applied.run).on_new_line());
    }
    Ok(paragraph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Alignment;

    #[test]
    fn test_apply_rule_converts_units_and_colours() {
        // Arrange
        let rule = StyleRule {
            font_name: Some("楷体".to_string()),
            color: Some("secondary".to_string()),
            alignment: Some(Alignment::Right),
            left_indent: Some(0.5),
            background: Some("table_header_bg".to_string()),
            ..Default::default()
        };

        // Act
        let applied = apply_rule(&rule, "quote").unwrap();

        // Assert
        assert_eq!(applied.paragraph.left_indent, Some(36.0));
        assert_eq!(applied.paragraph.alignment, Some(Alignment::Right));
        assert_eq!(applied.run.color, Some(Rgb(102, 102, 102)));
        assert_eq!(applied.shading, Some(Rgb(0xD9, 0xE2, 0xF3)));
    }

    #[test]
    fn test_invalid_rule_names_target() {
        let rule = StyleRule {
            font_size: Some(0.0),
            ..Default::default()
        };
        let err = apply_rule(&rule, "heading 2").unwrap_err();
        assert_eq!(err.to_string(), "invalid heading 2 style: font_size must be positive, got 0");
    }
}
