//! Tool configuration from docsmith.toml

use crate::builder::Decorations;
use crate::error::{DocError, Result};
use crate::markdown::{MarkdownParser, MetadataFilter, DEFAULT_LINE_PATTERNS, DEFAULT_SECTIONS};
use crate::styles::DEFAULT_TEMPLATE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no path is given
pub const CONFIG_FILE_NAME: &str = "docsmith.toml";

/// Main configuration from docsmith.toml
///
/// Every section is optional; a missing file gives the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory of extra or overriding style templates (*.toml)
    pub templates_dir: Option<PathBuf>,

    pub generate: GenerateConfig,

    pub filter: FilterConfig,

    pub project: ProjectInfo,
}

/// Markdown to Word generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Style template used when none is requested
    pub default_template: String,

    /// Page margins on all four sides, in inches
    pub margin_inches: f64,

    /// Add a centred page number footer
    pub page_numbers: bool,

    /// Text before the page number
    pub page_number_prefix: String,

    /// Text after the page number
    pub page_number_suffix: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            default_template: DEFAULT_TEMPLATE.to_string(),
            margin_inches: 1.0,
            page_numbers: true,
            page_number_prefix: "第 ".to_string(),
            page_number_suffix: " 页".to_string(),
        }
    }
}

/// Metadata filter applied to Markdown before parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub enabled: bool,

    /// Regular expressions matched against whole trimmed lines
    pub line_patterns: Vec<String>,

    /// Heading titles whose entire section is removed
    pub remove_sections: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            line_patterns: DEFAULT_LINE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            remove_sections: DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Project information shown in the running header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    pub project_name: Option<String>,
    pub report_type: Option<String>,
}

impl ProjectInfo {
    /// `"{project_name} - {report_type}"`, or `None` when neither is set
    pub fn header_text(&self) -> Option<String> {
        if self.project_name.is_none() && self.report_type.is_none() {
            return None;
        }
        Some(format!(
            "{} - {}",
            self.project_name.as_deref().unwrap_or(""),
            self.report_type.as_deref().unwrap_or("")
        ))
    }
}

impl AppConfig {
    /// Load configuration from a docsmith.toml file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DocError::Config(format!("{}: {}", path.display(), e)))?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| DocError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else docsmith.toml in the working directory, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = Path::new(CONFIG_FILE_NAME);
        if local.is_file() {
            log::info!("Using configuration from {}", local.display());
            return Self::load(local);
        }
        Ok(Self::default())
    }

    /// Save configuration as TOML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DocError::Config(e.to_string()))?;
        fs::write(&path, content).map_err(|e| DocError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        let margin = self.generate.margin_inches;
        if !margin.is_finite() || margin < 0.0 {
            return Err(DocError::Config(format!(
                "generate.margin_inches must not be negative, got {margin}"
            )));
        }
        self.metadata_filter().map(|_| ())
    }

    /// Filter built from the `[filter]` section
    pub fn metadata_filter(&self) -> Result<MetadataFilter> {
        MetadataFilter::new(&self.filter.line_patterns, &self.filter.remove_sections)
            .map_err(|e| DocError::Config(format!("invalid filter pattern: {e}")))
    }

    /// Markdown parser, filtering unless disabled here or by `no_filter`
    pub fn markdown_parser(&self, no_filter: bool) -> Result<MarkdownParser> {
        if no_filter || !self.filter.enabled {
            return Ok(MarkdownParser::new());
        }
        Ok(MarkdownParser::with_filter(self.metadata_filter()?))
    }

    /// Page decorations for a generate run
    pub fn decorations(&self, project: &ProjectInfo) -> Decorations {
        let page_numbers = self.generate.page_numbers.then(|| {
            (
                self.generate.page_number_prefix.clone(),
                self.generate.page_number_suffix.clone(),
            )
        });
        Decorations {
            margin_inches: self.generate.margin_inches,
            header: project.header_text(),
            page_numbers,
        }
    }
}
