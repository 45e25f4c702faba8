//! File locking for state shared between processes through the cache root.
//!
//! Cache entries themselves need no lock: they are written atomically and
//! every writer produces the same bytes. The dependency graph snapshot is
//! different, since each process merges its own edges into it, so writers
//! serialize on a lock file under `{cache_root}/.locks/`. Locks are released
//! when the [`CacheLock`] is dropped.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;

use crate::constants::LOCKS_DIR;
use crate::core::{IncludeError, Result};

/// An exclusive, process-wide file lock.
#[derive(Debug)]
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Acquire the lock named `name` under `cache_dir`.
    ///
    /// Waits until any other holder releases it. The blocking OS call runs on
    /// the blocking thread pool so the async runtime keeps making progress.
    ///
    /// # Lock File Location
    ///
    /// ```text
    /// {cache_dir}/.locks/{name}.lock
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the locks directory or lock file cannot be created,
    /// or the platform refuses the lock.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use lygia_resolver::cache::CacheLock;
    /// use std::path::Path;
    ///
    /// # async fn example() -> lygia_resolver::core::Result<()> {
    /// let lock = CacheLock::acquire(Path::new(".lygia-cache"), "graph").await?;
    /// // ... read-modify-write the shared file ...
    /// drop(lock);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn acquire(cache_dir: &Path, name: &str) -> Result<Self> {
        let locks_dir = cache_dir.join(LOCKS_DIR);
        crate::utils::fs::ensure_dir(&locks_dir).await?;

        let lock_path = locks_dir.join(format!("{name}.lock"));
        let open_path = lock_path.clone();

        let file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            let file = OpenOptions::new().create(true).write(true).truncate(true).open(&open_path)?;
            file.lock_exclusive()?;
            Ok(file)
        })
        .await
        .map_err(|e| IncludeError::Other {
            message: format!("Lock acquisition task failed: {e}"),
        })??;

        Ok(Self {
            file,
            path: lock_path,
        })
    }

    /// Path of the underlying lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        // Closing the file releases the lock too; unlocking explicitly keeps
        // the release immediate even if the handle outlives this value.
        #[allow(unstable_name_collisions)]
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}
