//! Block node types produced by the Markdown parser

use serde::{Deserialize, Serialize};

/// One structural unit of a Markdown document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockNode {
    /// ATX heading, level 1-6
    Heading { level: usize, text: String },

    /// Contiguous text lines joined with single spaces
    Paragraph { text: String },

    /// Pipe table; rows may be shorter or longer than the header
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },

    /// Flat list; ordering is decided by the first item's marker
    List { ordered: bool, items: Vec<String> },

    /// Block quote lines joined with single spaces
    Quote { text: String },

    /// Fenced code, verbatim
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        text: String,
    },

    /// Standalone image reference. Never embedded, always rendered as a placeholder.
    Image { alt: String, url: String, title: String },

    /// Horizontal rule
    #[serde(rename = "horizontal_rule")]
    Rule,
}

/// Style lookup key for a block, used by the style registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Heading(usize),
    Body,
    TableHeader,
    TableCell,
    List,
    Quote,
    Code,
}

impl BlockNode {
    /// Short lowercase name used in log and warning messages
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockNode::Heading { .. } => "heading",
            BlockNode::Paragraph { .. } => "paragraph",
            BlockNode::Table { .. } => "table",
            BlockNode::List { .. } => "list",
            BlockNode::Quote { .. } => "quote",
            BlockNode::Code { .. } => "code",
            BlockNode::Image { .. } => "image",
            BlockNode::Rule => "horizontal_rule",
        }
    }
}
