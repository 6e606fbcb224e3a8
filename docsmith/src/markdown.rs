//! Markdown parsing for report generation
//!
//! A small line-oriented parser that turns report Markdown into an ordered
//! list of block nodes. Inline emphasis is flattened to plain text; styling
//! comes from the block type and the selected style template.

mod blocks;
mod filter;
mod inline;
mod parser;

pub use blocks::{BlockKind, BlockNode};
pub use filter::{MetadataFilter, DEFAULT_LINE_PATTERNS, DEFAULT_SECTIONS};
pub use inline::strip_inline_styles;
pub use parser::{parse, MarkdownParser};
