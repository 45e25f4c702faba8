//! Temporary shader projects for tests.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::config::ResolverConfig;
use crate::constants::DEFAULT_CACHE_DIR_NAME;
use crate::directive::VirtualPath;

/// A temp directory holding shader sources and a `.lygia-cache`.
///
/// Everything is removed when the fixture is dropped.
#[derive(Debug)]
pub struct ShaderProject {
    temp_dir: TempDir,
}

impl ShaderProject {
    /// Create an empty project.
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new().context("Failed to create temp project")?,
        })
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the project.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// The project's cache directory (not created until first use).
    pub fn cache_dir(&self) -> PathBuf {
        self.root().join(DEFAULT_CACHE_DIR_NAME)
    }

    /// Default configuration pointed at this project's cache.
    pub fn config(&self) -> ResolverConfig {
        ResolverConfig::for_cache_dir(self.cache_dir())
    }

    /// Write a source file, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.path(relative), content)
    }

    /// Put a library document straight into the cache, as if fetched earlier.
    pub fn seed_cache(&self, virtual_path: &str, content: &str) -> Result<PathBuf> {
        let path = VirtualPath::new(virtual_path).cache_path(&self.cache_dir());
        write_file(&path, content)
    }

    /// Write `lygia.toml` at the project root.
    pub fn write_config(&self, toml: &str) -> Result<PathBuf> {
        self.write(crate::constants::DEFAULT_CONFIG_FILE, toml)
    }

    /// Read a file of the project back.
    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.path(relative);
        std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn write_file(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}
