//! Fill-in field detection in paragraph text

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Placeholder syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// `[name]`
    Bracket,
    /// Three or more underscores
    Underline,
    /// Full-width `（ ）`
    ChineseParen,
    /// `( )`
    Paren,
    /// `【name】`
    DoubleBracket,
    /// `{{name}}`
    DoubleBrace,
}

/// A detected placeholder inside a paragraph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderField {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Character (not byte) offset into the paragraph text
    pub position: usize,
    /// Literal matched text
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

static PATTERNS: LazyLock<Vec<(FieldKind, Regex)>> = LazyLock::new(|| {
    [
        (FieldKind::Bracket, r"\[(.+?)\]"),
        (FieldKind::Underline, r"___+"),
        (FieldKind::ChineseParen, r"（\s*）"),
        (FieldKind::Paren, r"\(\s*\)"),
        (FieldKind::DoubleBracket, r"【(.+?)】"),
        (FieldKind::DoubleBrace, r"\{\{(.+?)\}\}"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid placeholder regex")))
    .collect()
});

/// Find every placeholder in `text`
///
/// Results are grouped by kind in the order of [`FieldKind`], then by
/// position. A paragraph may contain several fields of mixed kinds.
pub fn detect_fields(text: &str) -> Vec<PlaceholderField> {
    let mut fields = Vec::new();
    for (kind, re) in PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let name = caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|n| !n.is_empty());
            fields.push(PlaceholderField {
                kind: *kind,
                position: text[..whole.start()].chars().count(),
                placeholder: whole.as_str().to_string(),
                name,
            });
        }
    }
    fields
}
