//! Classification of include tokens into remote or local targets.
//!
//! A token that starts with the namespace keyword followed by `/` names a
//! document of the remote library. The virtual pathname is the token with
//! exactly the keyword removed, separator kept:
//!
//! ```text
//! lygia/color/space/rgb2hsv.glsl  ->  /color/space/rgb2hsv.glsl
//! ```
//!
//! The same virtual pathname addresses the cache entry
//! (`<cache_root>/color/space/rgb2hsv.glsl`) and the remote URL
//! (`<remote_base>/color/space/rgb2hsv.glsl`).
//!
//! Any other token is relative to the directory of the document that contains
//! the directive. For local documents that is a filesystem directory; for
//! library documents it is the document's virtual directory, so relative
//! includes inside the library (`../math/const.glsl`) stay inside the library.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::Origin;
use crate::utils::fs::resolve_relative;

/// A namespace-relative pathname such as `/math/const.glsl`.
///
/// Always starts with `/`. Empty and `.` segments are dropped and `..`
/// segments are resolved, never climbing above the namespace root, so a
/// virtual path cannot address anything outside the cache root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualPath(String);

impl VirtualPath {
    /// Build a virtual path from a `/`-separated pathname.
    #[must_use]
    pub fn new(pathname: &str) -> Self {
        let mut segments: Vec<&str> = Vec::new();
        for segment in pathname.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        Self(format!("/{}", segments.join("/")))
    }

    /// Parse a directive token that starts with `<namespace>/`.
    ///
    /// Returns `None` when the token does not belong to the namespace; a token
    /// that merely starts with the keyword (`lygiafoo.glsl`) is not remote.
    #[must_use]
    pub fn from_token(token: &str, namespace: &str) -> Option<Self> {
        let rest = token.strip_prefix(namespace)?;
        rest.starts_with('/').then(|| Self::new(rest))
    }

    /// The pathname, with its leading `/`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the namespace root (`/`), which names no document.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Location of the cache entry for this path under `cache_root`.
    #[must_use]
    pub fn cache_path(&self, cache_root: &Path) -> PathBuf {
        self.0.trim_start_matches('/').split('/').fold(cache_root.to_path_buf(), |path, segment| {
            path.join(segment)
        })
    }

    /// Remote URL for this path under `remote_base`.
    #[must_use]
    pub fn url(&self, remote_base: &str) -> String {
        format!("{}{}", remote_base.trim_end_matches('/'), self.0)
    }

    /// Canonical document identifier, e.g. `lygia/math/const.glsl`.
    #[must_use]
    pub fn identifier(&self, namespace: &str) -> String {
        format!("{namespace}{}", self.0)
    }

    /// Resolve a relative token against this document's virtual directory.
    #[must_use]
    pub fn join_relative(&self, token: &str) -> Self {
        let dir = self.0.rsplit_once('/').map_or("", |(dir, _)| dir);
        Self::new(&format!("{dir}/{token}"))
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an include directive points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeTarget {
    /// A library document served by the remote content store.
    Remote(VirtualPath),
    /// A local file, as a normalized absolute path.
    Local(PathBuf),
}

impl IncludeTarget {
    /// Canonical identifier of the target document.
    #[must_use]
    pub fn identifier(&self, namespace: &str) -> String {
        match self {
            Self::Remote(virtual_path) => virtual_path.identifier(namespace),
            Self::Local(path) => path.display().to_string(),
        }
    }
}

/// Classify a directive token found in a document of the given origin.
#[must_use]
pub fn classify(token: &str, namespace: &str, includer: &Origin) -> IncludeTarget {
    if let Some(virtual_path) = VirtualPath::from_token(token, namespace) {
        return IncludeTarget::Remote(virtual_path);
    }

    match includer {
        Origin::Local(path) => {
            let base_dir = path.parent().unwrap_or(path);
            IncludeTarget::Local(resolve_relative(base_dir, token))
        }
        Origin::Remote(virtual_path) => IncludeTarget::Remote(virtual_path.join_relative(token)),
    }
}
