//! Input file checks shared by every operation

use crate::error::{DocError, Result};
use std::fs;
use std::path::Path;

/// Extensions accepted as Markdown sources
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Extensions accepted as Word documents
pub const DOCX_EXTENSIONS: &[&str] = &["docx"];

/// Extensions accepted as JSON descriptors
pub const JSON_EXTENSIONS: &[&str] = &["json"];

/// Check that `path` is a non-empty regular file with one of `extensions`
///
/// Extensions are compared case-insensitively.
pub fn validate_input(path: &Path, extensions: &[&str]) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|_| DocError::FileNotFound(path.to_path_buf()))?;
    if !metadata.is_file() {
        return Err(DocError::NotAFile(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !extensions.contains(&extension.as_str()) {
        return Err(DocError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
            expected: extensions.iter().map(|e| (*e).to_string()).collect(),
        });
    }

    if metadata.len() == 0 {
        return Err(DocError::EmptyFile(path.to_path_buf()));
    }
    Ok(())
}

/// Read a UTF-8 text input after validating it
pub fn read_text(path: &Path, extensions: &[&str]) -> Result<String> {
    validate_input(path, extensions)?;
    let text = fs::read_to_string(path).map_err(|source| DocError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Err(DocError::EmptyFile(path.to_path_buf()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_input_errors() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.md");
        let pdf = dir.path().join("report.pdf");
        let blank = dir.path().join("blank.md");
        fs::write(&empty, "").unwrap();
        fs::write(&pdf, "%PDF").unwrap();
        fs::write(&blank, "  \n\n").unwrap();

        // Act / Assert
        assert!(matches!(
            validate_input(&dir.path().join("missing.md"), MARKDOWN_EXTENSIONS),
            Err(DocError::FileNotFound(_))
        ));
        assert!(matches!(
            validate_input(dir.path(), MARKDOWN_EXTENSIONS),
            Err(DocError::NotAFile(_))
        ));
        assert!(matches!(
            validate_input(&empty, MARKDOWN_EXTENSIONS),
            Err(DocError::EmptyFile(_))
        ));
        assert!(matches!(
            validate_input(&pdf, MARKDOWN_EXTENSIONS),
            Err(DocError::UnsupportedFormat { ref extension, .. }) if extension == "pdf"
        ));
        assert!(matches!(
            read_text(&blank, MARKDOWN_EXTENSIONS),
            Err(DocError::EmptyFile(_))
        ));
    }

    #[test]
    fn test_unsupported_format_hints_name_accepted_extensions() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.yaml");
        fs::write(&path, "sections: []").unwrap();

        // Act
        let err = validate_input(&path, JSON_EXTENSIONS).unwrap_err();

        // Assert
        let hints = err.suggestions();
        assert!(hints[0].contains(".json"), "{hints:?}");
        assert!(!hints[0].contains(".md"), "{hints:?}");
        let md_hints = DocError::UnsupportedFormat {
            path: "r.pdf".into(),
            extension: "pdf".to_string(),
            expected: MARKDOWN_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
        .suggestions();
        assert_eq!(
            md_hints[0],
            "Use a file with one of these extensions: .md, .markdown, .txt"
        );
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Report.MD");
        fs::write(&path, "# Title").unwrap();
        assert_eq!(read_text(&path, MARKDOWN_EXTENSIONS).unwrap(), "# Title");
    }
}
