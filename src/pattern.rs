//! Glob filtering of shader source files.
//!
//! A [`ShaderFilter`] decides which files are handed to the resolver. A path
//! is accepted when it matches at least one `include` pattern and no
//! `exclude` pattern. With no `include` patterns configured the common shader
//! extensions are used:
//!
//! ```text
//! **/*.glsl  **/*.wgsl  **/*.vert  **/*.frag  **/*.vs  **/*.fs
//! ```
//!
//! # Pattern Syntax
//!
//! Standard glob syntax from the `glob` crate:
//!
//! - `*` matches any sequence of characters
//! - `**` matches any number of path components, including none
//! - `?` matches any single character
//! - `[abc]` / `[a-z]` match character sets and ranges
//!
//! Paths are matched with `/` separators on every platform.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::constants::DEFAULT_SHADER_PATTERNS;
use crate::core::{IncludeError, Result};

/// Include/exclude glob filter for shader files.
#[derive(Debug, Clone)]
pub struct ShaderFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl ShaderFilter {
    /// Compile a filter. An empty `include` list means the default shader
    /// patterns.
    ///
    /// # Errors
    ///
    /// [`IncludeError::Config`] naming the first pattern that fails to parse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lygia_resolver::pattern::ShaderFilter;
    /// use std::path::Path;
    ///
    /// # fn example() -> lygia_resolver::core::Result<()> {
    /// let filter = ShaderFilter::new(&[], &["**/vendor/**".to_string()])?;
    ///
    /// assert!(filter.matches(Path::new("src/main.frag")));
    /// assert!(!filter.matches(Path::new("src/vendor/noise.glsl")));
    /// assert!(!filter.matches(Path::new("src/main.rs")));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        let include = if include.is_empty() {
            compile(DEFAULT_SHADER_PATTERNS.iter().copied())?
        } else {
            compile(include.iter().map(String::as_str))?
        };
        let exclude = compile(exclude.iter().map(String::as_str))?;

        Ok(Self {
            include,
            exclude,
        })
    }

    /// Whether `path` passes the filter.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let candidate = path.to_string_lossy().replace('\\', "/");
        let included = self.include.iter().any(|pattern| pattern.matches(&candidate));
        let excluded = self.exclude.iter().any(|pattern| pattern.matches(&candidate));
        trace!("Filter {}: included={}, excluded={}", candidate, included, excluded);
        included && !excluded
    }

    /// Every file under `root` accepted by the filter, sorted.
    ///
    /// Patterns are matched against paths relative to `root`. Symlinks are not
    /// followed and unreadable entries are skipped.
    #[must_use]
    pub fn find_shaders(&self, root: &Path) -> Vec<PathBuf> {
        let mut shaders: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry.path().strip_prefix(root).is_ok_and(|relative| self.matches(relative))
            })
            .map(walkdir::DirEntry::into_path)
            .collect();
        shaders.sort();

        debug!("Found {} shader files under {}", shaders.len(), root.display());
        shaders
    }
}

impl Default for ShaderFilter {
    fn default() -> Self {
        Self {
            include: DEFAULT_SHADER_PATTERNS.iter().filter_map(|p| Pattern::new(p).ok()).collect(),
            exclude: Vec::new(),
        }
    }
}

fn compile<'a>(patterns: impl Iterator<Item = &'a str>) -> Result<Vec<Pattern>> {
    patterns
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| IncludeError::Config {
                message: format!("Invalid glob pattern '{pattern}': {e}"),
            })
        })
        .collect()
}
