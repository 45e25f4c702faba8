//! `lygia affected`: which entry shaders need rebuilding after a change.
//!
//! The answer comes from the include graph: the one persisted in the cache
//! by earlier `flatten` runs, extended by resolving the `--entry` shaders
//! given on this invocation.
//!
//! ```bash
//! lygia affected lygia/math/const.glsl --entry shaders/main.frag
//! lygia affected shaders/common/noise.glsl --format json
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::cache::Fetcher;
use crate::config::ResolverConfig;
use crate::resolver::Resolver;

/// List the entry documents affected by changed documents.
#[derive(Debug, Args)]
pub struct AffectedCommand {
    /// Changed documents: local paths or library identifiers (`lygia/...`).
    #[arg(value_name = "CHANGED", required = true)]
    changed: Vec<String>,

    /// Entry shaders to resolve first so their includes are known.
    #[arg(long = "entry", value_name = "FILE")]
    entries: Vec<PathBuf>,

    /// Output format.
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

impl AffectedCommand {
    /// Run with an HTTPS-backed resolver.
    pub async fn execute(self, config: &ResolverConfig) -> Result<()> {
        let resolver = Resolver::new(config)?;
        let roots = self.affected_roots(&resolver).await?;
        self.print(&roots)
    }

    pub(crate) async fn affected_roots<F: Fetcher>(
        &self,
        resolver: &Resolver<F>,
    ) -> Result<BTreeSet<String>> {
        resolver.load_graph().await.context("Failed to load the dependency graph")?;

        if !self.entries.is_empty() {
            try_join_all(self.entries.iter().map(|entry| resolver.resolve_file(entry))).await?;
            if let Err(e) = resolver.persist_graph().await {
                warn!("Failed to save dependency graph: {e}");
            }
        }

        let mut roots = BTreeSet::new();
        for changed in &self.changed {
            let affected = resolver.on_dependency_changed(changed);
            debug!("{} -> {:?}", changed, affected);
            roots.extend(affected);
        }
        Ok(roots)
    }

    fn print(&self, roots: &BTreeSet<String>) -> Result<()> {
        if self.format == "json" {
            println!("{}", serde_json::to_string_pretty(roots)?);
        } else {
            for root in roots {
                println!("{root}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ShaderProject, StaticFetcher};

    #[tokio::test]
    async fn test_entries_are_resolved_before_query() {
        let project = ShaderProject::new().unwrap();
        let main = project.write("main.frag", "#include \"lygia/math/const.glsl\"").unwrap();
        project.write("other.frag", "void main() {}").unwrap();
        let fetcher = StaticFetcher::new().with_document("/math/const.glsl", "PI");
        let resolver = Resolver::with_fetcher(&project.config(), fetcher).unwrap();

        let cmd = AffectedCommand {
            changed: vec!["lygia/math/const.glsl".to_string()],
            entries: vec![main.clone()],
            format: "text".to_string(),
        };
        let roots = cmd.affected_roots(&resolver).await.unwrap();
        assert_eq!(roots, BTreeSet::from([main.display().to_string()]));
    }

    #[tokio::test]
    async fn test_persisted_graph_is_used() {
        let project = ShaderProject::new().unwrap();
        let main = project.write("main.frag", "#include \"lygia/math/const.glsl\"").unwrap();
        let fetcher = StaticFetcher::new().with_document("/math/const.glsl", "PI");

        let first = Resolver::with_fetcher(&project.config(), fetcher.clone()).unwrap();
        first.resolve_file(&main).await.unwrap();
        first.persist_graph().await.unwrap();

        let second = Resolver::with_fetcher(&project.config(), fetcher).unwrap();
        let cmd = AffectedCommand {
            changed: vec!["lygia/math/const.glsl".to_string()],
            entries: Vec::new(),
            format: "json".to_string(),
        };
        let roots = cmd.affected_roots(&second).await.unwrap();
        assert_eq!(roots, BTreeSet::from([main.display().to_string()]));
    }
}
