//! Style template registry
//!
//! Built-in templates are TOML files compiled into the binary. A registry is
//! built once by the caller and passed around by reference; it is never
//! mutated after construction.

mod palette;
mod rule;

pub use palette::{is_known_color, resolve_color};
pub use rule::{StyleRule, StyleTemplate};

use crate::error::{DocError, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Built-in templates as (name, TOML content)
const EMBEDDED: &[(&str, &str)] = &[
    (
        "project_summary",
        include_str!("templates/project_summary.toml"),
    ),
    (
        "inspection_report",
        include_str!("templates/inspection_report.toml"),
    ),
    (
        "progress_analysis",
        include_str!("templates/progress_analysis.toml"),
    ),
    ("organize_plan", include_str!("templates/organize_plan.toml")),
];

/// Name of the template used when the caller does not choose one
pub const DEFAULT_TEMPLATE: &str = "project_summary";

/// Listing entry returned by [`StyleRegistry::list_templates`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

/// Read-only collection of style templates in registration order
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    templates: Vec<StyleTemplate>,
}

impl StyleRegistry {
    /// Registry containing the built-in templates
    pub fn builtin() -> Result<Self> {
        let templates = EMBEDDED
            .iter()
            .map(|(name, content)| {
                StyleTemplate::from_toml(content).map_err(|reason| DocError::InvalidTemplate {
                    name: (*name).to_string(),
                    reason,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { templates })
    }

    /// Built-in templates plus every `*.toml` file in `dir`
    ///
    /// A user template with the same name as a built-in one replaces it.
    pub fn with_directory<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut registry = Self::builtin()?;

        let entries = fs::read_dir(dir).map_err(|source| DocError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        for path in paths {
            let template = Self::load_file(&path)?;
            log::info!(
                "Loaded template '{}' from {}",
                template.name,
                path.display()
            );
            registry.insert(template);
        }
        Ok(registry)
    }

    /// Parse and validate a single template file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<StyleTemplate> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        StyleTemplate::from_toml(&content).map_err(|reason| DocError::InvalidTemplate {
            name: path.display().to_string(),
            reason,
        })
    }

    fn insert(&mut self, template: StyleTemplate) {
        match self.templates.iter_mut().find(|t| t.name == template.name) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
    }

    /// Look up a template by name
    pub fn get_template(&self, name: &str) -> Result<&StyleTemplate> {
        self.templates
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| DocError::UnknownTemplate {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Registered template names in order
    pub fn names(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.name.clone()).collect()
    }

    /// Name, display name and description of every template
    pub fn list_templates(&self) -> Vec<TemplateSummary> {
        self.templates
            .iter()
            .map(|t| TemplateSummary {
                name: t.name.clone(),
                display_name: t.display_name.clone(),
                description: t.description.clone(),
            })
            .collect()
    }
}
