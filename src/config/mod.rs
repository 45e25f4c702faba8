//! Resolver configuration.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. The project file `lygia.toml` in the working directory, or the file
//!    given with `--config`
//! 3. The `LYGIA_CACHE_DIR` environment variable, then `--cache-dir`
//!
//! # File Format
//!
//! Every key is optional:
//!
//! ```toml
//! # Where fetched library documents are stored. Relative paths are resolved
//! # against the directory containing this file.
//! cache_dir = ".lygia-cache"
//!
//! # Remote library location and the include keyword that routes to it.
//! remote_base = "https://lygia.xyz"
//! namespace = "lygia"
//!
//! # Network policy for cache misses.
//! fetch_timeout_secs = 30
//! fetch_retries = 2
//!
//! # Which files are treated as shader sources.
//! include = ["**/*.glsl", "**/*.frag"]
//! exclude = ["**/generated/**"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    CACHE_DIR_ENV, DEFAULT_CACHE_DIR_NAME, DEFAULT_CONFIG_FILE, DEFAULT_FETCH_RETRIES,
    DEFAULT_FETCH_TIMEOUT, DEFAULT_NAMESPACE, DEFAULT_REMOTE_BASE,
};
use crate::core::IncludeError;
use crate::pattern::ShaderFilter;

/// Settings shared by the resolver, the remote store and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Root of the on-disk cache of library documents.
    pub cache_dir: PathBuf,
    /// Base URL of the remote library, without trailing slash.
    pub remote_base: String,
    /// Include keyword that marks a directive as remote.
    pub namespace: String,
    /// Timeout for one fetch attempt, in seconds.
    pub fetch_timeout_secs: u64,
    /// Retries after a failed fetch attempt; only transient failures retry.
    pub fetch_retries: u32,
    /// Glob patterns of shader files to process. Empty means the defaults.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    /// Glob patterns of files to skip.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR_NAME),
            remote_base: DEFAULT_REMOTE_BASE.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            fetch_retries: DEFAULT_FETCH_RETRIES,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Default settings with the cache rooted at `cache_dir`.
    #[must_use]
    pub fn for_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    /// Load from `path` if given, otherwise from `lygia.toml` in the working
    /// directory. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    ///
    /// The `LYGIA_CACHE_DIR` environment variable is applied afterwards and
    /// a relative `cache_dir` is made absolute.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine working directory")?;

        let mut config = match path {
            Some(path) => Self::load_from(&path).await?,
            None => {
                let default_path = cwd.join(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(&default_path).await?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    let mut config = Self::default();
                    config.cache_dir = cwd.join(&config.cache_dir);
                    config
                }
            }
        };

        config.apply_env_overrides(&cwd);
        Ok(config)
    }

    /// Load and validate the file at `path`.
    ///
    /// A relative `cache_dir` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        if config.cache_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.cache_dir = crate::utils::fs::absolutize(&base.join(&config.cache_dir))
                .with_context(|| format!("Failed to resolve cache_dir in {}", path.display()))?;
        }

        config.validate().with_context(|| format!("Invalid config in {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self, cwd: &Path) {
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV)
            && !dir.is_empty()
        {
            debug!("Using cache directory from {}: {}", CACHE_DIR_ENV, dir);
            self.cache_dir = cwd.join(dir);
        }
    }

    /// Check values that would otherwise fail late and confusingly.
    ///
    /// # Errors
    ///
    /// [`IncludeError::Config`] describing the first invalid setting.
    pub fn validate(&self) -> std::result::Result<(), IncludeError> {
        if self.namespace.is_empty() || self.namespace.contains('/') {
            return Err(IncludeError::Config {
                message: format!(
                    "namespace must be a non-empty keyword without '/', got '{}'",
                    self.namespace
                ),
            });
        }
        if !(self.remote_base.starts_with("https://") || self.remote_base.starts_with("http://")) {
            return Err(IncludeError::Config {
                message: format!("remote_base must be an http(s) URL, got '{}'", self.remote_base),
            });
        }
        if self.fetch_timeout_secs == 0 {
            return Err(IncludeError::Config {
                message: "fetch_timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Per-attempt fetch timeout.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Compile the include/exclude patterns.
    ///
    /// # Errors
    ///
    /// [`IncludeError::Config`] if a pattern is not a valid glob.
    pub fn shader_filter(&self) -> std::result::Result<ShaderFilter, IncludeError> {
        ShaderFilter::new(&self.include, &self.exclude)
    }
}
