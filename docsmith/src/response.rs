//! Uniform result envelope for tool callers

use crate::error::DocError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Outcome of one operation, serialised with a `status` tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResponse {
    Success {
        operation: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        output_file: Option<PathBuf>,
        #[serde(skip_serializing_if = "Option::is_none")]
        file_size: Option<u64>,
        warnings: Vec<String>,
        /// Operation-specific fields
        details: serde_json::Value,
    },
    Error {
        error_type: String,
        error_message: String,
        suggestions: Vec<String>,
    },
}

impl ToolResponse {
    /// Successful operation without an output file
    pub fn success(operation: &str, details: serde_json::Value) -> Self {
        ToolResponse::Success {
            operation: operation.to_string(),
            output_file: None,
            file_size: None,
            warnings: Vec::new(),
            details,
        }
    }

    /// Successful operation that wrote `path`
    pub fn written(operation: &str, path: &Path, file_size: u64, details: serde_json::Value) -> Self {
        ToolResponse::Success {
            operation: operation.to_string(),
            output_file: Some(path.to_path_buf()),
            file_size: Some(file_size),
            warnings: Vec::new(),
            details,
        }
    }

    pub fn with_warnings(mut self, extra: Vec<String>) -> Self {
        if let ToolResponse::Success { warnings, .. } = &mut self {
            warnings.extend(extra);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResponse::Success { .. })
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            ToolResponse::Success { warnings, .. } => warnings,
            ToolResponse::Error { .. } => &[],
        }
    }

    /// Pretty JSON for printing
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self)
            .unwrap_or_else(|e| format!(r#"{{"status":"error","error_message":"{e}"}}"#))
    }
}

impl From<&DocError> for ToolResponse {
    fn from(error: &DocError) -> Self {
        ToolResponse::Error {
            error_type: error.error_type().to_string(),
            error_message: error.to_string(),
            suggestions: error.suggestions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        // Arrange
        let response = ToolResponse::written(
            "generate_word_report",
            Path::new("out/report.docx"),
            2048,
            json!({"template_used": "project_summary"}),
        )
        .with_warnings(vec!["Image 'a' rendered as a placeholder".to_string()]);

        // Act
        let value = serde_json::to_value(&response).unwrap();

        // Assert
        assert_eq!(value["status"], "success");
        assert_eq!(value["operation"], "generate_word_report");
        assert_eq!(value["file_size"], 2048);
        assert_eq!(value["warnings"].as_array().unwrap().len(), 1);
        assert_eq!(value["details"]["template_used"], "project_summary");
    }

    #[test]
    fn test_error_envelope_from_doc_error() {
        // Arrange
        let error = DocError::UnknownTemplate {
            name: "weekly".to_string(),
            available: vec!["project_summary".to_string()],
        };

        // Act
        let value = serde_json::to_value(ToolResponse::from(&error)).unwrap();

        // Assert
        assert_eq!(value["status"], "error");
        assert_eq!(value["error_type"], "unknown_template");
        assert!(value["error_message"].as_str().unwrap().contains("project_summary"));
        assert!(!value["suggestions"].as_array().unwrap().is_empty());
        assert!(value.get("output_file").is_none());
    }
}
