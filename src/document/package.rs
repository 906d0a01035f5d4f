/*!
 * Document package loading and saving.
 *
 * A package is the slide tree serialized as JSON. Saving goes through a
 * temporary file so a failed write never truncates an existing package.
 */

use std::path::Path;

use log::debug;

use crate::errors::DocumentError;
use crate::file_utils::FileManager;

use super::model::Presentation;

impl Presentation {
    /// Read and validate a package
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let presentation: Presentation =
            serde_json::from_str(&content).map_err(|e| DocumentError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        presentation.validate()?;

        debug!("Loaded {} slide(s) from {}", presentation.slides.len(), path.display());
        Ok(presentation)
    }

    /// Write the package atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let write_failed = |reason: String| DocumentError::WriteFailed {
            path: path.to_path_buf(),
            reason,
        };

        let content = serde_json::to_string_pretty(self).map_err(|e| write_failed(e.to_string()))?;
        FileManager::write_atomic(path, &content).map_err(|e| write_failed(format!("{:#}", e)))?;
        Ok(())
    }
}
