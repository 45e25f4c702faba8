//! File system utilities shared by the local reader, the cache and the CLI.
//!
//! # Key Features
//!
//! - **Lexical path normalization**: `.` and `..` are resolved without touching
//!   the filesystem, so identifiers are stable even for files that do not exist
//! - **Atomic writes**: content is written to a sibling temp file and renamed
//!   into place, so readers never observe a partially written cache entry
//! - **Idempotent directory creation**: an existing directory is not an error
//!
//! # Examples
//!
//! ```rust,no_run
//! use lygia_resolver::utils::fs::{atomic_write, resolve_relative};
//! use std::path::Path;
//!
//! # async fn example() -> std::io::Result<()> {
//! let target = resolve_relative(Path::new("/project/shaders"), "../common/noise.glsl");
//! assert_eq!(target, Path::new("/project/common/noise.glsl"));
//!
//! atomic_write(Path::new("/tmp/cache/math/const.glsl"), b"#define PI 3.14159").await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter making temp file names unique within the process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Normalizes a path by resolving `.` and `..` components.
///
/// This is a logical operation: symbolic links are not followed and the path
/// does not need to exist. `..` never removes a root or drive prefix, so
/// `/a/../../b` becomes `/b`.
///
/// # Examples
///
/// ```rust
/// use lygia_resolver::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("/foo/./bar/../baz")), PathBuf::from("/foo/baz"));
/// assert_eq!(normalize_path(Path::new("../src/./lib.rs")), PathBuf::from("../src/lib.rs"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Resolve `token` relative to `base_dir` and normalize the result.
#[must_use]
pub fn resolve_relative(base_dir: &Path, token: &str) -> PathBuf {
    normalize_path(&base_dir.join(token))
}

/// Make `path` absolute against the process working directory, normalized.
///
/// # Errors
///
/// Returns an error if the path is relative and the working directory
/// cannot be determined.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize_path(path))
    } else {
        Ok(normalize_path(&std::env::current_dir()?.join(path)))
    }
}

/// Create `path` and all missing parents; an existing directory is fine.
///
/// # Errors
///
/// Returns an error if creation fails or `path` exists but is not a directory.
pub async fn ensure_dir(path: &Path) -> std::io::Result<()> {
    match tokio::fs::create_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// 1. Parent directories are created if missing
/// 2. Content goes to a uniquely named temp file next to the target
/// 3. The temp file is renamed over the target
///
/// Concurrent writers of identical content are harmless: each rename replaces
/// the file with a complete copy. On failure the temp file is removed.
///
/// # Errors
///
/// Returns the underlying I/O error of whichever step failed.
pub async fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let temp_path = path.with_file_name(format!(
        ".{file_name}.{}.{}.tmp",
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    if let Err(e) = tokio::fs::write(&temp_path, content).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    Ok(())
}
