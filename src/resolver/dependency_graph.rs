//! Reverse dependency graph used for change invalidation.
//!
//! The graph maps every included document to the set of documents that
//! include it (child -> parents). Edges are added as resolution discovers
//! them and are never removed: a document that stops including something
//! keeps its old edge until the process exits, which only ever causes an
//! extra reload, never a missed one.
//!
//! Direct include cycles are rejected during resolution, but edges
//! accumulated across passes can still form cycles in the parent relation
//! (A included B yesterday, B includes A today), so every walk tracks the
//! nodes it has visited.
//!
//! # Persistence
//!
//! A snapshot can be written to `{cache_root}/.graph.json` so that separate
//! invocations (`lygia flatten` followed by `lygia affected`) share what was
//! learned. Writers merge their edges into the snapshot already on disk while
//! holding a [`CacheLock`], so concurrent processes never drop each other's
//! edges.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::path::Path;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::cache::CacheLock;
use crate::core::{IncludeError, Result};
use crate::utils::fs::atomic_write;

/// Serialized form: child identifier -> sorted parent identifiers.
pub type GraphSnapshot = BTreeMap<String, BTreeSet<String>>;

/// Process-wide include graph, safe to update from concurrent resolutions.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    parents: DashMap<String, HashSet<String>>,
}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `parent` includes `child`. Idempotent.
    pub fn add_edge(&self, child: &str, parent: &str) {
        let inserted =
            self.parents.entry(child.to_string()).or_default().insert(parent.to_string());
        if inserted {
            debug!("Recorded include edge {} -> {}", parent, child);
        }
    }

    /// Direct includers of `child`, sorted. Empty for unknown identifiers.
    #[must_use]
    pub fn parents_of(&self, child: &str) -> BTreeSet<String> {
        self.parents
            .get(child)
            .map(|parents| parents.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `identifier` has been seen as an included document.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.parents.contains_key(identifier)
    }

    /// Number of included documents with at least one recorded parent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether no edge has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Every root document transitively including `changed`.
    ///
    /// A root is a document nobody includes. If `changed` is itself a root
    /// (including an identifier the graph has never seen) the result is just
    /// `{changed}`. Cycles among parents terminate because each node is
    /// expanded at most once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lygia_resolver::resolver::DependencyGraph;
    ///
    /// let graph = DependencyGraph::new();
    /// graph.add_edge("/p/mid.glsl", "/p/root.frag");
    /// graph.add_edge("/p/leaf.glsl", "/p/mid.glsl");
    ///
    /// let roots = graph.find_affected_roots("/p/leaf.glsl");
    /// assert_eq!(roots.into_iter().collect::<Vec<_>>(), vec!["/p/root.frag"]);
    /// ```
    #[must_use]
    pub fn find_affected_roots(&self, changed: &str) -> BTreeSet<String> {
        let mut roots = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([changed.to_string()]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }

            let parents = self.parents_of(&current);
            if parents.is_empty() {
                roots.insert(current);
                continue;
            }

            for parent in parents {
                if !visited.contains(&parent) {
                    queue.push_back(parent);
                }
            }
        }

        roots
    }

    /// Copy of all edges in a stable order.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        self.parents
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().iter().cloned().collect()))
            .collect()
    }

    /// Add every edge of `snapshot` to this graph.
    pub fn merge(&self, snapshot: GraphSnapshot) {
        for (child, parents) in snapshot {
            let mut entry = self.parents.entry(child).or_default();
            entry.extend(parents);
        }
    }

    /// Load a graph from a snapshot file.
    ///
    /// A missing file yields an empty graph. A file that cannot be parsed is
    /// ignored with a warning; the snapshot only ever widens invalidation, so
    /// losing it costs extra reloads rather than correctness.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn load(path: &Path) -> Result<Self> {
        let graph = Self::new();
        if let Some(snapshot) = read_snapshot(path).await? {
            graph.merge(snapshot);
        }
        Ok(graph)
    }

    /// Merge this graph into the snapshot at `path`.
    ///
    /// Edges already on disk are pulled into `self` as well, so after this
    /// call both sides hold the union.
    ///
    /// # Errors
    ///
    /// [`IncludeError::CacheWrite`] if the snapshot cannot be written, or an
    /// error if the lock cannot be acquired.
    pub async fn persist(&self, path: &Path) -> Result<()> {
        let lock_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let _lock = CacheLock::acquire(lock_dir, "graph").await?;

        if let Some(on_disk) = read_snapshot(path).await? {
            self.merge(on_disk);
        }

        let json = serde_json::to_vec_pretty(&self.snapshot()).map_err(|e| IncludeError::Other {
            message: format!("Failed to serialize dependency graph: {e}"),
        })?;
        atomic_write(path, &json).await.map_err(|source| IncludeError::CacheWrite {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Persisted dependency graph ({} documents) to {}", self.len(), path.display());
        Ok(())
    }
}

async fn read_snapshot(path: &Path) -> Result<Option<GraphSnapshot>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice(&bytes) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) => {
            warn!("Ignoring corrupt dependency graph snapshot {}: {}", path.display(), e);
            Ok(None)
        }
    }
}
