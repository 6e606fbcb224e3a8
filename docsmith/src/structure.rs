//! Structure templates extracted from reference documents
//!
//! A [`StructureTemplate`] stores the flat, ordered list of headings and
//! paragraphs of a reference document together with its style sheet and page
//! geometry. The section tree is a view computed from the flat list.

mod extractor;
mod placeholder;

pub use extractor::{extract, heading_level, ExtractOptions, Extraction};
pub use placeholder::{detect_fields, FieldKind, PlaceholderField};

use crate::error::{DocError, Result};
use crate::format::{PageGeometry, ParagraphFormat, RunFormat};
use crate::output::prepare_output;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Descriptor format version written into metadata
pub const TEMPLATE_VERSION: &str = "1.0";

/// Where a template came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    pub source_document: String,
    pub version: String,
}

/// A paragraph style with its `basedOn` chain already applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDefinition {
    /// Style id inside the document, e.g. `Heading1`
    pub id: String,
    pub name: String,
    /// Display name of the parent style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub based_on: Option<String>,
    #[serde(default)]
    pub paragraph_format: ParagraphFormat,
    #[serde(default)]
    pub font: RunFormat,
}

/// Heading or body paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Heading,
    Paragraph,
}

/// One non-empty paragraph of the reference document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Position of the paragraph in the source, counting empty paragraphs
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Heading level, 0 for body paragraphs
    pub level: usize,
    pub text: String,
    /// Style display name
    pub style: String,
    #[serde(default)]
    pub format: ParagraphFormat,
    /// Formatting of the first run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_format: Option<RunFormat>,
    #[serde(default)]
    pub fields: Vec<PlaceholderField>,
}

impl Element {
    pub fn is_heading(&self, level: usize) -> bool {
        self.kind == ElementKind::Heading && self.level == level
    }
}

/// Summary counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// All source paragraphs, including empty ones
    pub total_paragraphs: usize,
    pub total_sections: usize,
    /// Heading count per level, keyed `level_N`
    pub heading_levels: BTreeMap<String, usize>,
    pub total_styles: usize,
    pub total_fields: usize,
}

/// Extracted, reusable description of a document's format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureTemplate {
    pub metadata: TemplateMetadata,
    pub page_settings: PageGeometry,
    pub styles: BTreeMap<String, StyleDefinition>,
    pub document_structure: Vec<Element>,
    #[serde(default)]
    pub statistics: Statistics,
}

/// Level-2 group inside a section
#[derive(Debug, Clone, PartialEq)]
pub struct Subsection<'a> {
    pub heading: &'a Element,
    pub paragraphs: Vec<&'a Element>,
}

/// Level-1 group of the section tree
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    pub heading: &'a Element,
    /// Paragraphs before the first subsection
    pub paragraphs: Vec<&'a Element>,
    pub subsections: Vec<Subsection<'a>>,
}

impl StructureTemplate {
    /// Group the flat element list into level-1 sections and level-2 subsections
    ///
    /// Level-2 headings before any level-1 heading and paragraphs before the
    /// first section stay in the flat list only. Deeper headings are not part
    /// of the tree.
    pub fn sections(&self) -> Vec<Section<'_>> {
        let mut sections: Vec<Section<'_>> = Vec::new();

        for element in &self.document_structure {
            match element.kind {
                ElementKind::Heading if element.level == 1 => sections.push(Section {
                    heading: element,
                    paragraphs: Vec::new(),
                    subsections: Vec::new(),
                }),
                ElementKind::Heading if element.level == 2 => {
                    if let Some(section) = sections.last_mut() {
                        section.subsections.push(Subsection {
                            heading: element,
                            paragraphs: Vec::new(),
                        });
                    }
                }
                ElementKind::Heading => {}
                ElementKind::Paragraph => {
                    let Some(section) = sections.last_mut() else {
                        continue;
                    };
                    match section.subsections.last_mut() {
                        Some(sub) => sub.paragraphs.push(element),
                        None => section.paragraphs.push(element),
                    }
                }
            }
        }

        sections
    }

    /// Recompute [`Statistics`] from the current contents
    ///
    /// `total_paragraphs` is kept, since empty source paragraphs are not stored.
    pub fn refresh_statistics(&mut self) {
        let mut heading_levels = BTreeMap::new();
        for element in &self.document_structure {
            if element.kind == ElementKind::Heading {
                *heading_levels
                    .entry(format!("level_{}", element.level))
                    .or_insert(0) += 1;
            }
        }
        self.statistics = Statistics {
            total_paragraphs: self.statistics.total_paragraphs,
            total_sections: self.sections().len(),
            heading_levels,
            total_styles: self.styles.len(),
            total_fields: self.document_structure.iter().map(|e| e.fields.len()).sum(),
        };
    }

    /// Find a style definition by display name
    pub fn style(&self, name: &str) -> Option<&StyleDefinition> {
        self.styles.get(name)
    }

    /// Load a template descriptor from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| DocError::Descriptor {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save the template as pretty-printed UTF-8 JSON
    ///
    /// The file is staged beside `path` and only replaces it once fully
    /// written. Returns the size in bytes.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        let mut pending = prepare_output(path)?;
        pending.write_json(self)?;
        pending.commit()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn element(index: usize, kind: ElementKind, level: usize, text: &str) -> Element {
        let style = match kind {
            ElementKind::Heading => format!("Heading {level}"),
            ElementKind::Paragraph => "Normal".to_string(),
        };
        Element {
            index,
            kind,
            level,
            text: text.to_string(),
            style,
            format: ParagraphFormat::default(),
            run_format: None,
            fields: detect_fields(text),
        }
    }

    pub(crate) fn template(elements: Vec<Element>) -> StructureTemplate {
        let mut template = StructureTemplate {
            metadata: TemplateMetadata {
                source_document: "reference.docx".to_string(),
                version: TEMPLATE_VERSION.to_string(),
            },
            page_settings: PageGeometry::default(),
            styles: BTreeMap::new(),
            document_structure: elements,
            statistics: Statistics::default(),
        };
        template.statistics.total_paragraphs = template.document_structure.len();
        template.refresh_statistics();
        template
    }

    #[test]
    fn test_section_tree_groups_in_source_order() {
        // Arrange
        let t = template(vec![
            element(0, ElementKind::Paragraph, 0, "cover"),
            element(1, ElementKind::Heading, 2, "orphan"),
            element(2, ElementKind::Heading, 1, "One"),
            element(3, ElementKind::Paragraph, 0, "intro"),
            element(4, ElementKind::Heading, 2, "One.A"),
            element(5, ElementKind::Paragraph, 0, "a1"),
            element(6, ElementKind::Heading, 3, "deep"),
            element(7, ElementKind::Paragraph, 0, "a2"),
            element(8, ElementKind::Heading, 1, "Two"),
        ]);

        // Act
        let sections = t.sections();

        // Assert
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading.text, "One");
        assert_eq!(sections[0].paragraphs.len(), 1);
        assert_eq!(sections[0].paragraphs[0].text, "intro");
        assert_eq!(sections[0].subsections.len(), 1);
        let texts: Vec<_> = sections[0].subsections[0]
            .paragraphs
            .iter()
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(texts, vec!["a1", "a2"]);
        assert!(sections[1].paragraphs.is_empty());
    }

    #[test]
    fn test_statistics() {
        let t = template(vec![
            element(0, ElementKind::Heading, 1, "[项目名称]总结"),
            element(1, ElementKind::Heading, 2, "概况"),
            element(2, ElementKind::Heading, 2, "进度"),
            element(3, ElementKind::Paragraph, 0, "日期：___"),
        ]);
        assert_eq!(t.statistics.total_sections, 1);
        assert_eq!(t.statistics.heading_levels.get("level_2"), Some(&2));
        assert_eq!(t.statistics.total_fields, 2);
    }

    #[test]
    fn test_json_roundtrip() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("template.json");
        let t = template(vec![element(0, ElementKind::Heading, 1, "总则")]);

        // Act
        t.save(&path).unwrap();
        let loaded = StructureTemplate::load(&path).unwrap();

        // Assert
        assert_eq!(loaded, t);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("总则"), "JSON must not escape non-ASCII text");
        assert!(raw.contains("\"type\": \"heading\""));
    }

    #[test]
    fn test_save_onto_directory_fails_without_side_effects() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");
        std::fs::create_dir(&path).unwrap();
        let t = template(vec![element(0, ElementKind::Heading, 1, "总则")]);

        // Act
        let result = t.save(&path);

        // Assert
        assert!(matches!(result, Err(DocError::OutputNotWritable { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(std::fs::read_dir(&path).unwrap().count(), 0);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            StructureTemplate::load(&path),
            Err(DocError::Descriptor { .. })
        ));
    }
}
