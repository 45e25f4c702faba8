//! `lygia cache`: inspect and clear the library cache.
//!
//! ```bash
//! lygia cache info    # location, document count, size
//! lygia cache clean   # remove everything, forcing refetches
//! lygia cache path    # print the cache root
//! ```

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::cache::{CacheInfo, Fetcher, HttpFetcher, RemoteStore};
use crate::config::ResolverConfig;
use crate::resolver::DependencyGraph;

/// Cache management subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show cache location and usage.
    Info,
    /// Delete all cached documents and the dependency graph snapshot.
    Clean,
    /// Print the cache directory.
    Path,
}

impl CacheCommand {
    /// Run the subcommand against the configured cache.
    pub async fn execute(self, config: &ResolverConfig) -> Result<()> {
        let store = RemoteStore::<HttpFetcher>::from_config(config)?;
        self.execute_with(&store).await
    }

    pub(crate) async fn execute_with<F: Fetcher>(self, store: &RemoteStore<F>) -> Result<()> {
        match self {
            Self::Info => {
                let info = store.info().await?;
                let graph = DependencyGraph::load(&store.graph_snapshot_path()).await?;
                println!("{}", "Cache Information".bold());
                println!("  Location:  {}", store.root().display());
                println!("  Documents: {}", info.documents);
                println!("  Size:      {}", format_size(info.bytes));
                println!("  Tracked includes: {}", graph.len());
                if info.stale_temp_files > 0 {
                    println!(
                        "  {} {} leftover temp file(s) from interrupted writes; \
                         `lygia cache clean` removes them",
                        "!".yellow(),
                        info.stale_temp_files
                    );
                }
            }
            Self::Clean => {
                let CacheInfo {
                    documents,
                    bytes,
                    ..
                } = store.clean().await?;
                println!(
                    "{} Removed {} cached document(s) ({})",
                    "✓".green(),
                    documents,
                    format_size(bytes)
                );
            }
            Self::Path => println!("{}", store.root().display()),
        }
        Ok(())
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
