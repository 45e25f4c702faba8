//! Documents flowing through a resolution pass.

use std::fmt;
use std::path::PathBuf;

use crate::directive::VirtualPath;

/// Where a document's raw content came from.
///
/// The location is kept so that relative includes inside the document can be
/// resolved against the document's own directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A file on the local filesystem, by absolute path.
    Local(PathBuf),
    /// A document of the remote library, by virtual pathname.
    Remote(VirtualPath),
}

/// One source text taking part in a resolution pass.
///
/// Documents are transient: they are created when content is read and
/// dropped once their flattened text has been substituted into the parent.
#[derive(Debug, Clone)]
pub struct Document {
    /// Canonical identifier: an absolute local path, or the namespace-qualified
    /// virtual path (`lygia/math/const.glsl`) for remote content.
    pub identifier: String,
    /// Raw, unflattened content.
    pub content: String,
    /// Where the content came from.
    pub origin: Origin,
}

impl Document {
    /// Create a local document; the identifier is the path's display form.
    pub fn local(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            identifier: path.display().to_string(),
            content: content.into(),
            origin: Origin::Local(path),
        }
    }

    /// Create a remote document identified under `namespace`.
    pub fn remote(virtual_path: VirtualPath, namespace: &str, content: impl Into<String>) -> Self {
        Self {
            identifier: virtual_path.identifier(namespace),
            content: content.into(),
            origin: Origin::Remote(virtual_path),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}
