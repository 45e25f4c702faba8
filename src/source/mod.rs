//! Local file reader.
//!
//! Local includes are resolved against the directory of the including
//! document and read as UTF-8 text. There is no search path: a token either
//! names a file relative to its includer or the include fails with
//! [`IncludeError::LocalRead`] carrying the resolved absolute path.

use std::path::Path;

use tracing::debug;

use crate::core::{Document, IncludeError, Result};
use crate::utils::fs::{absolutize, resolve_relative};

/// Reads local include targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalReader;

impl LocalReader {
    /// Create a reader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Read `token` relative to `base_dir`.
    ///
    /// # Errors
    ///
    /// [`IncludeError::LocalRead`] when the file is missing, unreadable, or not
    /// valid UTF-8.
    pub async fn get(&self, token: &str, base_dir: &Path) -> Result<Document> {
        self.read(&resolve_relative(base_dir, token)).await
    }

    /// Read the file at `path`, made absolute against the working directory.
    ///
    /// # Errors
    ///
    /// [`IncludeError::LocalRead`] naming the absolute path on any read failure.
    pub async fn read(&self, path: &Path) -> Result<Document> {
        let path = absolutize(path).map_err(|source| IncludeError::LocalRead {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Reading local include {}", path.display());
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Document::local(path, content)),
            Err(source) => Err(IncludeError::LocalRead {
                path,
                source,
            }),
        }
    }
}
