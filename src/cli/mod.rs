//! Command-line interface for the `lygia` binary.
//!
//! # Commands
//!
//! - `flatten` - Resolve every include of a shader (or a directory of shaders)
//! - `affected` - List the entry shaders that must be rebuilt after a change
//! - `cache` - Inspect or clear the local library cache
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug logging
//! - `--quiet` / `-q` - Errors only
//! - `--config` / `-c` - Configuration file (default: `./lygia.toml`)
//! - `--cache-dir` - Cache root, overriding config and `LYGIA_CACHE_DIR`
//!
//! Logs go to stderr; stdout carries only command output, so
//! `lygia flatten main.frag > out.frag` works as expected. `RUST_LOG`, when
//! set, takes precedence over `--verbose` and `--quiet`.
//!
//! # Examples
//!
//! ```bash
//! lygia flatten shaders/main.frag -o build/main.frag
//! lygia flatten shaders/ -o build/
//! lygia affected lygia/math/const.glsl --entry shaders/main.frag
//! lygia cache info
//! ```

mod affected;
mod cache;
mod flatten;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::ResolverConfig;

/// Settings derived from the global flags, applied before a command runs.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
    /// Explicit cache root.
    pub cache_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Install the stderr tracing subscriber. Later calls are no-ops.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the resolver configuration and apply `--cache-dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded.
    pub async fn load_resolver_config(&self) -> Result<ResolverConfig> {
        let mut config = ResolverConfig::load_with_optional(self.config_path.clone()).await?;
        if let Some(cache_dir) = &self.cache_dir {
            config.cache_dir = crate::utils::fs::absolutize(cache_dir)?;
        }
        Ok(config)
    }
}

/// Flatten `#include` directives in shader sources, fetching library
/// documents from the remote library on demand.
#[derive(Parser)]
#[command(
    name = "lygia",
    about = "Resolve #include directives in shader sources",
    version,
    long_about = "Flattens GLSL/WGSL shaders by inlining local includes and \
                  documents of the lygia library, cached on disk."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (default: ./lygia.toml when present).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Cache root for fetched library documents.
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a shader file, or every shader under a directory.
    ///
    /// See [`flatten::FlattenCommand`].
    Flatten(flatten::FlattenCommand),

    /// List entry shaders affected by changes to the given documents.
    ///
    /// See [`affected::AffectedCommand`].
    Affected(affected::AffectedCommand),

    /// Manage the library cache.
    #[command(subcommand)]
    Cache(cache::CacheCommand),
}

impl Cli {
    /// Run the parsed command.
    ///
    /// # Errors
    ///
    /// Returns whatever the command fails with; `main` renders it through
    /// [`crate::core::user_friendly_error`].
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
            cache_dir: self.cache_dir.clone(),
        }
    }

    /// Run the command with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns whatever the command fails with.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let resolver_config = config.load_resolver_config().await?;

        match self.command {
            Commands::Flatten(cmd) => cmd.execute(&resolver_config).await,
            Commands::Affected(cmd) => cmd.execute(&resolver_config).await,
            Commands::Cache(cmd) => cmd.execute(&resolver_config).await,
        }
    }
}
