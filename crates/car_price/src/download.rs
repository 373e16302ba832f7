//! Hand-off of an exported document to the user.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

/// A document ready to be saved, with the name and type it is offered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Wraps an exported prediction report.
    #[must_use]
    pub const fn report(bytes: Vec<u8>) -> Self {
        Self {
            file_name: report::FILE_NAME,
            mime_type: report::MIME_TYPE,
            bytes,
        }
    }

    /// Writes the document into `dir` under its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save_into(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
        let path = dir.join(self.file_name);
        self.save_as(&path)?;
        Ok(path)
    }

    /// Writes the document to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_as(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(
            path = %path.display(),
            mime_type = self.mime_type,
            bytes = self.bytes.len(),
            "Saved download"
        );
        Ok(())
    }
}
