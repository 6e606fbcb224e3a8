//! Content descriptors poured into structure templates

use crate::error::{DocError, Result};
use crate::format::{ParagraphFormat, RunFormat};
use crate::output::prepare_output;
use crate::structure::{Element, StructureTemplate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One paragraph of new content
///
/// In JSON this is either a bare string, `{"image": ..., "alt": ...}`, or
/// `{"text": ..., "style": ..., "format": ..., "run_format": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParagraphContent {
    Text(String),
    Image {
        image: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Styled {
        text: String,
        /// Style display name from the template
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<ParagraphFormat>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run_format: Option<RunFormat>,
    },
}

impl From<&str> for ParagraphContent {
    fn from(text: &str) -> Self {
        ParagraphContent::Text(text.to_string())
    }
}

/// Level-2 block of content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSubsection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub paragraphs: Vec<ParagraphContent>,
}

/// Level-1 block of content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub paragraphs: Vec<ParagraphContent>,
    #[serde(default)]
    pub subsections: Vec<ContentSubsection>,
}

/// New content, matched to template sections by position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentTree {
    pub sections: Vec<ContentSection>,
}

impl ContentTree {
    /// Content mirroring `template`, with the original texts as starting content
    pub fn skeleton(template: &StructureTemplate) -> Self {
        let texts = |elements: &[&Element]| -> Vec<ParagraphContent> {
            elements
                .iter()
                .map(|e| ParagraphContent::Text(e.text.clone()))
                .collect()
        };

        let sections = template
            .sections()
            .iter()
            .map(|section| ContentSection {
                title: Some(section.heading.text.clone()),
                paragraphs: texts(&section.paragraphs),
                subsections: section
                    .subsections
                    .iter()
                    .map(|sub| ContentSubsection {
                        title: Some(sub.heading.text.clone()),
                        paragraphs: texts(&sub.paragraphs),
                    })
                    .collect(),
            })
            .collect();

        ContentTree { sections }
    }

    /// Total number of paragraphs, titles not included
    pub fn paragraph_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| {
                s.paragraphs.len() + s.subsections.iter().map(|sub| sub.paragraphs.len()).sum::<usize>()
            })
            .sum()
    }

    /// Load a content descriptor
    ///
    /// The top level must be an object with a `sections` array.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| DocError::Descriptor {
                path: path.to_path_buf(),
                source,
            })?;

        if !value.get("sections").is_some_and(serde_json::Value::is_array) {
            return Err(DocError::InvalidContent {
                path: path.to_path_buf(),
                reason: "missing top-level \"sections\" array".to_string(),
            });
        }

        serde_json::from_value(value).map_err(|source| DocError::Descriptor {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save as pretty-printed UTF-8 JSON
    ///
    /// The file is staged beside `path` and only replaces it once fully
    /// written. Returns the size in bytes.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        let mut pending = prepare_output(path)?;
        pending.write_json(self)?;
        pending.commit()
    }
}
