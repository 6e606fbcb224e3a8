//! Document building
//!
//! Two modes share one set of formatting helpers:
//! - Markdown blocks styled by a named [`StyleTemplate`](crate::styles::StyleTemplate)
//! - A [`ContentTree`] poured into an extracted
//!   [`StructureTemplate`](crate::structure::StructureTemplate)
//!
//! Problems with a single block or section are recorded as warnings on the
//! [`BuildReport`]; building itself never fails.

mod apply;
mod content;
mod fill;
mod markdown;
mod styled;

pub use content::{ContentSection, ContentSubsection, ContentTree, ParagraphContent};
pub use fill::fill_template;
pub use markdown::{build_markdown, Decorations, MAX_OUTLINE_LEVEL};
pub use styled::{
    HeadingInfo, PageNumberFooter, ParagraphStyleDef, RunningHeader, StyledCell, StyledDocument,
    StyledElement, StyledParagraph, StyledRun, StyledTable,
};

use thiserror::Error;

/// Why a single block could not be rendered
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    /// A style rule has values Word cannot represent
    #[error("invalid {target} style: {reason}")]
    InvalidRule { target: String, reason: String },

    /// A table with no header cells has no columns
    #[error("table has no header row")]
    EmptyTable,
}

/// Result of a build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub document: StyledDocument,
    pub warnings: Vec<String>,
    /// Blocks or content paragraphs visited, including ones that failed
    pub nodes_processed: usize,
}
