//! In-memory model of an existing Word document
//!
//! The reader keeps only what structure extraction needs: the style sheet,
//! body paragraphs with their literal formatting, table text and the page
//! geometry of the first section.

mod docx;

pub use docx::read_docx;

use crate::format::{PageGeometry, ParagraphFormat, RunFormat};
use serde::{Deserialize, Serialize};

/// Kind of a style sheet entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleKind {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleKind {
    /// Map a `w:style/@w:type` value; missing types default to paragraph
    pub fn from_ooxml(value: Option<&str>) -> Self {
        match value {
            Some("character") => StyleKind::Character,
            Some("table") => StyleKind::Table,
            Some("numbering") => StyleKind::Numbering,
            _ => StyleKind::Paragraph,
        }
    }
}

/// One entry of the document's style sheet, with only its own properties
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStyle {
    pub id: String,
    pub name: String,
    pub kind: StyleKind,
    /// Style id of the parent style
    pub based_on: Option<String>,
    pub paragraph: ParagraphFormat,
    pub run: RunFormat,
}

/// A run of uniformly formatted text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRun {
    pub text: String,
    pub format: RunFormat,
}

/// A body paragraph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceParagraph {
    /// Style id from `w:pStyle`; `None` means the default paragraph style
    pub style_id: Option<String>,
    pub format: ParagraphFormat,
    pub runs: Vec<SourceRun>,
}

impl SourceParagraph {
    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Cell text of a body table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    pub rows: Vec<Vec<String>>,
}

/// A decoded Word document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDocument {
    /// Geometry of the first section, if the document declares one
    pub page: Option<PageGeometry>,
    pub styles: Vec<SourceStyle>,
    pub paragraphs: Vec<SourceParagraph>,
    pub tables: Vec<SourceTable>,
}

impl SourceDocument {
    /// Look up a style by id
    pub fn style(&self, id: &str) -> Option<&SourceStyle> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// Display name of the style a paragraph uses
    ///
    /// Paragraphs without a style reference use "Normal". Unknown ids are
    /// returned as-is.
    pub fn style_name(&self, style_id: Option<&str>) -> String {
        match style_id {
            None => self
                .style("Normal")
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "Normal".to_string()),
            Some(id) => self
                .style(id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| id.to_string()),
        }
    }
}

/// Word stores built-in style names in lowercase ("heading 1"); present them
/// the way Word's UI does ("Heading 1").
pub(crate) fn normalize_style_name(name: &str) -> String {
    const BUILTIN: &[&str] = &["normal", "heading", "title", "subtitle", "caption", "quote"];
    let lower_first = name.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let first_word = name.split_whitespace().next().unwrap_or_default();
    if lower_first && BUILTIN.contains(&first_word) {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    } else {
        name.to_string()
    }
}
