//! Style rules and templates

use crate::format::Alignment;
use crate::markdown::BlockKind;
use serde::{Deserialize, Serialize};

/// Formatting for one block type
///
/// Sizes and spacing are in points, indents in inches, line spacing is a
/// multiplier. Colours are palette names or `#RRGGBB` literals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_before: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_after: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_indent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_line_indent: Option<f64>,
    /// Cell shading, only meaningful for table headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl StyleRule {
    /// Check numeric attributes for values Word cannot represent
    pub fn validate(&self) -> Result<(), String> {
        if let Some(size) = self.font_size {
            if !size.is_finite() || size <= 0.0 {
                return Err(format!("font_size must be positive, got {size}"));
            }
        }
        if let Some(spacing) = self.line_spacing {
            if !spacing.is_finite() || spacing <= 0.0 {
                return Err(format!("line_spacing must be positive, got {spacing}"));
            }
        }
        let lengths = [
            ("space_before", self.space_before),
            ("space_after", self.space_after),
            ("left_indent", self.left_indent),
            ("first_line_indent", self.first_line_indent),
        ];
        for (name, value) in lengths {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("{name} must not be negative, got {v}"));
                }
            }
        }
        if let Some(name) = &self.font_name {
            if name.trim().is_empty() {
                return Err("font_name must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Italic muted paragraph used in place of images
    pub fn image_placeholder() -> Self {
        StyleRule {
            font_size: Some(11.0),
            italic: Some(true),
            color: Some("placeholder".to_string()),
            space_after: Some(12.0),
            ..Default::default()
        }
    }

    /// Small muted line under an image placeholder carrying its source path
    pub fn image_source() -> Self {
        StyleRule {
            font_size: Some(9.0),
            italic: Some(true),
            color: Some("placeholder".to_string()),
            ..Default::default()
        }
    }

    /// Language label above a code block
    pub fn code_label() -> Self {
        StyleRule {
            font_size: Some(9.0),
            color: Some("secondary".to_string()),
            space_after: Some(3.0),
            ..Default::default()
        }
    }

    /// Underscore line standing in for a horizontal rule
    pub fn horizontal_rule() -> Self {
        StyleRule {
            font_size: Some(8.0),
            color: Some("secondary".to_string()),
            space_before: Some(6.0),
            space_after: Some(6.0),
            ..Default::default()
        }
    }
}

/// A named, complete set of style rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleTemplate {
    /// Registry key, e.g. `project_summary`
    pub name: String,
    /// Human-readable name
    pub display_name: String,
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h1: Option<StyleRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h2: Option<StyleRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h3: Option<StyleRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h4: Option<StyleRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h5: Option<StyleRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h6: Option<StyleRule>,

    pub body: StyleRule,
    pub table_header: StyleRule,
    pub table_cell: StyleRule,
    pub list: StyleRule,
    pub quote: StyleRule,
    pub code: StyleRule,
}

impl StyleTemplate {
    /// Parse a template from TOML
    pub fn from_toml(content: &str) -> Result<Self, String> {
        let template: StyleTemplate = toml::from_str(content).map_err(|e| e.to_string())?;
        template.validate()?;
        Ok(template)
    }

    /// Rule for a heading level; levels without a rule use the body rule
    pub fn heading(&self, level: usize) -> &StyleRule {
        let rule = match level {
            1 => self.h1.as_ref(),
            2 => self.h2.as_ref(),
            3 => self.h3.as_ref(),
            4 => self.h4.as_ref(),
            5 => self.h5.as_ref(),
            6 => self.h6.as_ref(),
            _ => None,
        };
        rule.unwrap_or(&self.body)
    }

    /// Rule for any block kind; always resolves
    pub fn rule(&self, kind: BlockKind) -> &StyleRule {
        match kind {
            BlockKind::Heading(level) => self.heading(level),
            BlockKind::Body => &self.body,
            BlockKind::TableHeader => &self.table_header,
            BlockKind::TableCell => &self.table_cell,
            BlockKind::List => &self.list,
            BlockKind::Quote => &self.quote,
            BlockKind::Code => &self.code,
        }
    }

    /// Validate the name and every rule
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("template name must not be empty".to_string());
        }
        let headings = [&self.h1, &self.h2, &self.h3, &self.h4, &self.h5, &self.h6];
        for (i, rule) in headings.iter().enumerate() {
            if let Some(rule) = rule {
                rule.validate().map_err(|e| format!("h{}: {}", i + 1, e))?;
            }
        }
        let named = [
            ("body", &self.body),
            ("table_header", &self.table_header),
            ("table_cell", &self.table_cell),
            ("list", &self.list),
            ("quote", &self.quote),
            ("code", &self.code),
        ];
        for (name, rule) in named {
            rule.validate().map_err(|e| format!("{name}: {e}"))?;
        }
        Ok(())
    }
}
