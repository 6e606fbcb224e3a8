//! Output file handling
//!
//! The destination is checked and a temporary file is opened beside it before
//! any document is built. The temporary file replaces the destination only on
//! [`PendingOutput::commit`]; dropping a pending output removes it.

use crate::error::{DocError, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A destination with a temporary file ready to receive the document
#[derive(Debug)]
pub struct PendingOutput {
    target: PathBuf,
    temp: NamedTempFile,
}

impl PendingOutput {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Writable handle to the temporary file
    pub fn file(&mut self) -> &mut File {
        self.temp.as_file_mut()
    }

    /// Serialize `value` as pretty-printed UTF-8 JSON into the temporary file
    pub fn write_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let target = self.target.clone();
        let mut writer = BufWriter::new(self.temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
            DocError::Descriptor {
                path: target.clone(),
                source,
            }
        })?;
        writer
            .flush()
            .map_err(|e| DocError::Write(format!("{}: {}", target.display(), e)))
    }

    /// Move the temporary file over the destination and return its size
    pub fn commit(self) -> Result<u64> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| DocError::OutputNotWritable {
                path: target.clone(),
                reason: e.error.to_string(),
            })?;
        let size = fs::metadata(&target)
            .map(|m| m.len())
            .map_err(|e| DocError::Write(format!("{}: {}", target.display(), e)))?;
        log::info!("Saved {} ({} bytes)", target.display(), size);
        Ok(size)
    }
}

/// Validate `path` as an output destination and open a temporary file next to it
///
/// Missing parent directories are created. Directories and read-only files are
/// rejected.
pub fn prepare_output<P: AsRef<Path>>(path: P) -> Result<PendingOutput> {
    let target = path.as_ref().to_path_buf();

    if target.is_dir() {
        return Err(DocError::OutputNotWritable {
            path: target,
            reason: "destination is a directory".to_string(),
        });
    }
    if let Ok(metadata) = fs::metadata(&target) {
        if metadata.permissions().readonly() {
            return Err(DocError::OutputNotWritable {
                path: target,
                reason: "destination is read-only".to_string(),
            });
        }
    }

    let parent = match target.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|source| DocError::OutputDirectory {
        path: parent.clone(),
        source,
    })?;

    let temp = NamedTempFile::new_in(&parent).map_err(|e| DocError::OutputNotWritable {
        path: target.clone(),
        reason: e.to_string(),
    })?;
    log::debug!("Staging {} at {}", target.display(), temp.path().display());

    Ok(PendingOutput { target, temp })
}
