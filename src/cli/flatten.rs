//! `lygia flatten`: inline every include of one shader or a directory tree.
//!
//! ```bash
//! lygia flatten main.frag                 # flattened text on stdout
//! lygia flatten main.frag -o out.frag     # written to a file
//! lygia flatten shaders/ -o build/        # mirrors the tree under build/
//! ```
//!
//! Include edges discovered while flattening are merged into the cache's
//! graph snapshot so that a later `lygia affected` can answer from them.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{info, warn};

use crate::cache::Fetcher;
use crate::config::ResolverConfig;
use crate::constants::{FALLBACK_CORE_COUNT, PARALLELISM_CORE_MULTIPLIER};
use crate::resolver::Resolver;
use crate::utils::fs::{absolutize, atomic_write};

/// Flatten a shader file or every shader under a directory.
#[derive(Debug, Args)]
pub struct FlattenCommand {
    /// Shader file or directory to flatten.
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Output file, or output directory when PATH is a directory.
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Maximum number of shaders flattened at once (default: 2x CPU cores)
    #[arg(long, value_name = "NUM")]
    max_parallel: Option<NonZeroUsize>,
}

impl FlattenCommand {
    /// Run with an HTTPS-backed resolver.
    pub async fn execute(self, config: &ResolverConfig) -> Result<()> {
        let resolver = Resolver::new(config)?;
        self.execute_with(&resolver).await
    }

    pub(crate) async fn execute_with<F: Fetcher>(self, resolver: &Resolver<F>) -> Result<()> {
        let path = absolutize(&self.path)
            .with_context(|| format!("Failed to resolve {}", self.path.display()))?;

        if path.is_dir() {
            let Some(output) = &self.output else {
                bail!("--output is required when flattening a directory");
            };
            let output = absolutize(output)?;
            let count = flatten_tree(resolver, &path, &output, self.parallelism()).await?;
            println!(
                "{} Flattened {} shader(s) into {}",
                "✓".green(),
                count,
                output.display()
            );
        } else {
            if !resolver.accepts(&path) {
                warn!("{} does not match the shader patterns, flattening anyway", path.display());
            }
            let flattened = resolver.resolve_file(&path).await?;
            match &self.output {
                Some(output) => {
                    write_output(output, &flattened).await?;
                    println!(
                        "{} Flattened {} -> {}",
                        "✓".green(),
                        self.path.display(),
                        output.display()
                    );
                }
                None => print!("{flattened}"),
            }
        }

        if let Err(e) = resolver.persist_graph().await {
            warn!("Failed to save dependency graph: {e}");
        }
        Ok(())
    }

    fn parallelism(&self) -> usize {
        self.max_parallel.map_or_else(
            || {
                let cores = std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(FALLBACK_CORE_COUNT);
                cores * PARALLELISM_CORE_MULTIPLIER
            },
            NonZeroUsize::get,
        )
    }
}

async fn flatten_tree<F: Fetcher>(
    resolver: &Resolver<F>,
    root: &Path,
    output: &Path,
    concurrency: usize,
) -> Result<usize> {
    let shaders: Vec<PathBuf> = resolver
        .find_shaders(root)
        .into_iter()
        .filter(|shader| !shader.starts_with(output))
        .collect();
    info!(
        "Flattening {} shader(s) under {} ({} at a time)",
        shaders.len(),
        root.display(),
        concurrency
    );

    stream::iter(shaders.iter().map(|shader| async move {
        let flattened = resolver.resolve_file(shader).await?;
        let relative = shader.strip_prefix(root).unwrap_or(shader);
        write_output(&output.join(relative), &flattened).await
    }))
    .buffer_unordered(concurrency.max(1))
    .try_collect::<Vec<()>>()
    .await?;

    Ok(shaders.len())
}

async fn write_output(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
