//! Format-neutral model of a document ready to be written
//!
//! Both build modes produce a [`StyledDocument`]; the DOCX writer is the only
//! place that knows about WordprocessingML.

use crate::format::{Alignment, PageGeometry, ParagraphFormat, Rgb, RunFormat};

/// A run of text with direct formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledRun {
    pub text: String,
    pub format: RunFormat,
    /// Insert a line break before the text
    pub break_before: bool,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, format: RunFormat) -> Self {
        Self {
            text: text.into(),
            format,
            break_before: false,
        }
    }

    /// Same run, starting on a new line
    pub fn on_new_line(mut self) -> Self {
        self.break_before = true;
        self
    }
}

/// Heading marker on a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingInfo {
    /// Level used for visual styling, 1-6
    pub level: usize,
    /// Level exposed to the navigation outline, after clamping
    pub outline_level: usize,
}

/// A paragraph with optional named style and direct formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledParagraph {
    /// Paragraph style id, e.g. `Heading1`
    pub style_id: Option<String>,
    pub heading: Option<HeadingInfo>,
    pub format: ParagraphFormat,
    pub runs: Vec<StyledRun>,
}

impl StyledParagraph {
    /// Concatenated run text, with breaks as newlines
    pub fn text(&self) -> String {
        let mut text = String::new();
        for run in &self.runs {
            if run.break_before {
                text.push('\n');
            }
            text.push_str(&run.text);
        }
        text
    }
}

/// A table cell holding one paragraph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledCell {
    pub paragraph: StyledParagraph,
    pub shading: Option<Rgb>,
}

/// A rectangular table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledTable {
    pub rows: Vec<Vec<StyledCell>>,
}

impl StyledTable {
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// Block-level content
#[derive(Debug, Clone, PartialEq)]
pub enum StyledElement {
    Paragraph(StyledParagraph),
    Table(StyledTable),
}

/// A paragraph style to register in the output style sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphStyleDef {
    pub id: String,
    pub name: String,
    pub paragraph: ParagraphFormat,
    pub run: RunFormat,
    /// Outline level for heading styles
    pub outline_level: Option<usize>,
}

/// Text repeated at the top of every page
#[derive(Debug, Clone, PartialEq)]
pub struct RunningHeader {
    pub text: String,
    pub format: RunFormat,
    pub alignment: Alignment,
}

/// Page number field with surrounding text, e.g. "第 3 页"
#[derive(Debug, Clone, PartialEq)]
pub struct PageNumberFooter {
    pub prefix: String,
    pub suffix: String,
    pub format: RunFormat,
    pub alignment: Alignment,
}

/// A complete document before serialisation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledDocument {
    pub page: PageGeometry,
    pub header: Option<RunningHeader>,
    pub footer: Option<PageNumberFooter>,
    pub paragraph_styles: Vec<ParagraphStyleDef>,
    pub elements: Vec<StyledElement>,
}

impl StyledDocument {
    pub fn new(page: PageGeometry) -> Self {
        Self {
            page,
            ..Default::default()
        }
    }

    pub fn push_paragraph(&mut self, paragraph: StyledParagraph) {
        self.elements.push(StyledElement::Paragraph(paragraph));
    }

    pub fn push_table(&mut self, table: StyledTable) {
        self.elements.push(StyledElement::Table(table));
    }

    /// Register a paragraph style unless one with the same id exists
    pub fn register_style(&mut self, style: ParagraphStyleDef) {
        if !self.paragraph_styles.iter().any(|s| s.id == style.id) {
            self.paragraph_styles.push(style);
        }
    }

    /// Top-level paragraphs in order
    pub fn paragraphs(&self) -> impl Iterator<Item = &StyledParagraph> {
        self.elements.iter().filter_map(|e| match e {
            StyledElement::Paragraph(p) => Some(p),
            StyledElement::Table(_) => None,
        })
    }

    /// Heading paragraphs in order
    pub fn headings(&self) -> impl Iterator<Item = &StyledParagraph> {
        self.paragraphs().filter(|p| p.heading.is_some())
    }
}
