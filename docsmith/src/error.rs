//! Error types shared by every docsmith operation

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, DocError>;

/// Errors that abort an operation
///
/// Problems with a single block or section never surface here; they are
/// collected as warnings on the build report instead.
#[derive(Error, Debug)]
pub enum DocError {
    /// Input path does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Input path exists but is a directory or special file
    #[error("Path is not a regular file: {0}")]
    NotAFile(PathBuf),

    /// Input file has no content
    #[error("File is empty: {0}")]
    EmptyFile(PathBuf),

    /// Input file has an extension the operation cannot handle
    #[error("Unsupported file format '{extension}': {path}")]
    UnsupportedFormat {
        /// Offending file
        path: PathBuf,
        /// Extension found on the file (may be empty)
        extension: String,
        /// Extensions the operation accepts
        expected: Vec<String>,
    },

    /// Input container could not be decoded
    #[error("Document is corrupt or not a valid .docx: {path} ({reason})")]
    CorruptDocument {
        /// Offending file
        path: PathBuf,
        /// What went wrong while decoding
        reason: String,
    },

    /// Input could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Offending file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Requested style template is not registered
    #[error("Unknown template '{name}'. Available templates: {}", available.join(", "))]
    UnknownTemplate {
        /// Requested name
        name: String,
        /// Names that are registered
        available: Vec<String>,
    },

    /// Style template failed to parse or validate
    #[error("Invalid template '{name}': {reason}")]
    InvalidTemplate {
        /// Template name or source file
        name: String,
        /// Validation failure
        reason: String,
    },

    /// Template or content descriptor could not be parsed or serialized
    #[error("Invalid descriptor {path}: {source}")]
    Descriptor {
        /// Descriptor file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Content descriptor parsed but lacks required structure
    #[error("Invalid content descriptor {path}: {reason}")]
    InvalidContent {
        /// Descriptor file
        path: PathBuf,
        /// What is missing
        reason: String,
    },

    /// Output destination cannot be written
    #[error("Output path is not writable: {path} ({reason})")]
    OutputNotWritable {
        /// Destination
        path: PathBuf,
        /// Why the destination was rejected
        reason: String,
    },

    /// Output directory could not be created
    #[error("Failed to create output directory {path}: {source}")]
    OutputDirectory {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Serializing the finished document failed
    #[error("Failed to write document: {0}")]
    Write(String),

    /// Configuration file problem
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DocError {
    /// Short machine-readable tag for the error envelope
    pub fn error_type(&self) -> &'static str {
        match self {
            DocError::FileNotFound(_) => "file_not_found",
            DocError::NotAFile(_) | DocError::EmptyFile(_) | DocError::Read { .. } => {
                "invalid_input"
            }
            DocError::UnsupportedFormat { .. } => "unsupported_format",
            DocError::CorruptDocument { .. } => "corrupt_document",
            DocError::UnknownTemplate { .. } => "unknown_template",
            DocError::InvalidTemplate { .. } => "invalid_template",
            DocError::Descriptor { .. } | DocError::InvalidContent { .. } => "invalid_descriptor",
            DocError::OutputNotWritable { .. } | DocError::OutputDirectory { .. } => {
                "output_not_writable"
            }
            DocError::Write(_) => "write_failed",
            DocError::Config(_) => "config_error",
        }
    }

    /// Remediation hints shown to the caller alongside the message
    pub fn suggestions(&self) -> Vec<String> {
        if let DocError::UnsupportedFormat { expected, .. } = self {
            let accepted = expected.iter().map(|e| format!(".{e}")).collect::<Vec<_>>();
            return vec![format!(
                "Use a file with one of these extensions: {}",
                accepted.join(", ")
            )];
        }
        let hints: &[&str] = match self {
            DocError::FileNotFound(_) => &[
                "Check that the path is spelled correctly",
                "Use an absolute path if the working directory is uncertain",
            ],
            DocError::NotAFile(_) => &["Pass a file path, not a directory"],
            DocError::EmptyFile(_) => &["Add content to the input file and try again"],
            DocError::UnsupportedFormat { .. } => &[],
            DocError::CorruptDocument { .. } => &[
                "Open the document in Word and save it again as .docx",
                "Legacy .doc files must be converted to .docx first",
            ],
            DocError::Read { .. } => &["Check the file permissions"],
            DocError::UnknownTemplate { .. } => &[
                "Run `docsmith list-templates` to see the registered templates",
            ],
            DocError::InvalidTemplate { .. } => &[
                "Font sizes and line spacing must be positive",
                "Spacing and indents must not be negative",
            ],
            DocError::Descriptor { .. } | DocError::InvalidContent { .. } => &[
                "Descriptors must be UTF-8 JSON",
                "Content descriptors need a top-level \"sections\" array",
                "Run `docsmith skeleton` to generate a starting content file",
            ],
            DocError::OutputNotWritable { .. } | DocError::OutputDirectory { .. } => &[
                "Choose an output path in a writable directory",
                "Close the file if it is open in another program",
            ],
            DocError::Write(_) => &["Check free disk space and retry"],
            DocError::Config(_) => &["Check docsmith.toml for syntax errors"],
        };
        hints.iter().map(|s| (*s).to_string()).collect()
    }
}
