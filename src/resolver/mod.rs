//! Recursive include resolution and change invalidation.
//!
//! A [`Resolver`] is the session context: it owns the remote content store,
//! the local reader and the [`DependencyGraph`], and is shared by every
//! resolution pass of a session. Independent sessions (for example two
//! tests) simply use independent resolvers.
//!
//! # Resolution
//!
//! [`Resolver::resolve`] flattens a document depth-first:
//!
//! 1. The content is scanned line by line for include directives
//! 2. Each directive is classified as a library or local target
//! 3. If the target is already being resolved further up the current
//!    include chain the pass fails with [`IncludeError::CyclicInclude`]
//! 4. Otherwise its raw content is fetched or read and resolved recursively
//! 5. The flattened child replaces the directive line, and the edge
//!    `child -> parent` is recorded in the graph
//!
//! Sibling includes are resolved concurrently; the output keeps source line
//! order regardless of completion order. Any failure aborts the whole pass
//! and no partial text is returned.
//!
//! The active include chain is passed explicitly down the recursion and is
//! used for nothing but cycle detection. The same document may legitimately
//! appear several times in the flattened output (a diamond of includes); only
//! a document including itself, directly or transitively, is an error.
//!
//! # Invalidation
//!
//! [`Resolver::on_dependency_changed`] answers "which entry documents must be
//! rebuilt?" by walking the graph upward from the changed document.
//!
//! # Examples
//!
//! ```rust,no_run
//! use lygia_resolver::config::ResolverConfig;
//! use lygia_resolver::resolver::Resolver;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ResolverConfig::load_with_optional(None).await?;
//! let resolver = Resolver::new(&config)?;
//!
//! let source = "#include \"lygia/math/const.glsl\"\nvoid main() {}\n";
//! let flattened = resolver.resolve("shaders/main.frag", source).await?;
//!
//! for root in resolver.on_dependency_changed("lygia/math/const.glsl") {
//!     println!("rebuild {root}");
//! }
//! # let _ = flattened;
//! # Ok(())
//! # }
//! ```

pub mod dependency_graph;

pub use dependency_graph::{DependencyGraph, GraphSnapshot};

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{BoxFuture, try_join_all};
use tracing::{debug, info, warn};

use crate::cache::{Fetcher, HttpFetcher, RemoteStore};
use crate::config::ResolverConfig;
use crate::core::{Document, IncludeError, Result};
use crate::directive::{IncludeDirective, IncludeTarget, VirtualPath, classify, scan, split_lines};
use crate::pattern::ShaderFilter;
use crate::source::LocalReader;
use crate::utils::fs::absolutize;

/// Session context for include resolution.
pub struct Resolver<F: Fetcher = HttpFetcher> {
    remote: RemoteStore<F>,
    local: LocalReader,
    graph: Arc<DependencyGraph>,
    namespace: String,
    filter: ShaderFilter,
}

impl Resolver<HttpFetcher> {
    /// Create a resolver fetching library documents over HTTPS.
    ///
    /// # Errors
    ///
    /// [`IncludeError::Config`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        config.validate()?;
        let remote = RemoteStore::from_config(config)?;
        Self::from_parts(config, remote)
    }
}

impl<F: Fetcher> Resolver<F> {
    /// Create a resolver with a custom fetcher.
    ///
    /// # Errors
    ///
    /// [`IncludeError::Config`] if the configuration is invalid.
    pub fn with_fetcher(config: &ResolverConfig, fetcher: F) -> Result<Self> {
        config.validate()?;
        Self::from_parts(config, RemoteStore::with_fetcher(config, fetcher))
    }

    fn from_parts(config: &ResolverConfig, remote: RemoteStore<F>) -> Result<Self> {
        Ok(Self {
            remote,
            local: LocalReader::new(),
            graph: Arc::new(DependencyGraph::new()),
            namespace: config.namespace.clone(),
            filter: config.shader_filter()?,
        })
    }

    /// Share an existing graph instead of starting from an empty one.
    #[must_use]
    pub fn with_graph(mut self, graph: Arc<DependencyGraph>) -> Self {
        self.graph = graph;
        self
    }

    /// The session's dependency graph.
    #[must_use]
    pub fn graph(&self) -> &Arc<DependencyGraph> {
        &self.graph
    }

    /// The session's remote content store.
    #[must_use]
    pub fn remote(&self) -> &RemoteStore<F> {
        &self.remote
    }

    /// Whether `path` is a shader file this resolver should process.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        self.filter.matches(path)
    }

    /// Shader files under `root` accepted by the filter, excluding anything
    /// inside the cache directory.
    #[must_use]
    pub fn find_shaders(&self, root: &Path) -> Vec<PathBuf> {
        let cache_root = self.remote.root();
        self.filter
            .find_shaders(root)
            .into_iter()
            .filter(|path| !path.starts_with(cache_root))
            .collect()
    }

    /// The identifier `raw` refers to: library identifiers are kept, anything
    /// else is treated as a local path and made absolute.
    #[must_use]
    pub fn canonical_identifier(&self, raw: &str) -> String {
        if let Some(virtual_path) = VirtualPath::from_token(raw, &self.namespace) {
            return virtual_path.identifier(&self.namespace);
        }
        absolutize(Path::new(raw))
            .map_or_else(|_| raw.to_string(), |path| path.display().to_string())
    }

    /// Flatten `content`, the text of the local document at `path`.
    ///
    /// Relative includes are resolved against the directory of `path`, which
    /// is made absolute against the working directory first.
    ///
    /// # Errors
    ///
    /// - [`IncludeError::LocalRead`] if a local include cannot be read
    /// - [`IncludeError::Fetch`] if a library document is not cached and
    ///   cannot be fetched
    /// - [`IncludeError::CyclicInclude`] if a document includes itself
    pub async fn resolve(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<String>,
    ) -> Result<String> {
        let path = path.as_ref();
        let path = absolutize(path).map_err(|source| IncludeError::LocalRead {
            path: path.to_path_buf(),
            source,
        })?;

        let document = Document::local(path, content);
        info!("Resolving includes in {}", document);
        self.resolve_document(document, Vec::new()).await
    }

    /// Read the local file at `path` and flatten it.
    ///
    /// # Errors
    ///
    /// As [`Resolver::resolve`], plus [`IncludeError::LocalRead`] if `path`
    /// itself cannot be read.
    pub async fn resolve_file(&self, path: &Path) -> Result<String> {
        let document = self.local.read(path).await?;
        info!("Resolving includes in {}", document);
        self.resolve_document(document, Vec::new()).await
    }

    /// Flatten `document`; `active_stack` holds the identifiers of the
    /// documents currently being resolved above it, outermost first.
    fn resolve_document(
        &self,
        document: Document,
        active_stack: Vec<String>,
    ) -> BoxFuture<'_, Result<String>> {
        Box::pin(async move {
            let directives = scan(&document.content);
            if directives.is_empty() {
                return Ok(document.content);
            }

            let mut stack = active_stack;
            stack.push(document.identifier.clone());

            let pending = directives
                .iter()
                .map(|(line, directive)| self.resolve_include(&document, directive, &stack, *line));
            let resolved = try_join_all(pending).await?;

            let mut substitutions: HashMap<usize, String> = directives
                .iter()
                .map(|(line, _)| *line)
                .zip(resolved)
                .collect();

            let flattened: Vec<String> = split_lines(&document.content)
                .enumerate()
                .map(|(index, line)| {
                    substitutions.remove(&index).unwrap_or_else(|| line.to_string())
                })
                .collect();

            Ok(flattened.join("\n"))
        })
    }

    async fn resolve_include(
        &self,
        includer: &Document,
        directive: &IncludeDirective,
        stack: &[String],
        line: usize,
    ) -> Result<String> {
        let anomalies = directive.anomalies();
        if !anomalies.is_empty() {
            debug!(
                "Tolerated malformed include at {}:{}: {:?}",
                includer,
                line + 1,
                anomalies
            );
        }

        let target = classify(&directive.path_token, &self.namespace, &includer.origin);
        if let IncludeTarget::Remote(virtual_path) = &target
            && virtual_path.is_root()
        {
            warn!(
                "Ignoring include of the library root at {}:{}: {}",
                includer,
                line + 1,
                directive.raw_line.trim()
            );
            return Ok(directive.raw_line.clone());
        }
        let target_id = target.identifier(&self.namespace);

        if let Some(start) = stack.iter().position(|id| *id == target_id) {
            let mut chain: Vec<&str> = stack[start..].iter().map(String::as_str).collect();
            chain.push(&target_id);
            return Err(IncludeError::CyclicInclude {
                chain: chain.join(" -> "),
            });
        }

        let child = match target {
            IncludeTarget::Remote(virtual_path) => {
                let content = self.remote.get(&virtual_path).await?;
                Document::remote(virtual_path, &self.namespace, content)
            }
            IncludeTarget::Local(path) => self.local.read(&path).await?,
        };

        let flattened = self.resolve_document(child, stack.to_vec()).await?;
        self.graph.add_edge(&target_id, &includer.identifier);
        Ok(flattened)
    }

    /// Root documents to rebuild after `changed` was modified.
    ///
    /// `changed` may be a library identifier (`lygia/math/const.glsl`) or a
    /// local path. A document nothing includes is its own root.
    #[must_use]
    pub fn on_dependency_changed(&self, changed: &str) -> BTreeSet<String> {
        let identifier = self.canonical_identifier(changed);
        let roots = self.graph.find_affected_roots(&identifier);
        debug!("{} affects {} root(s)", identifier, roots.len());
        roots
    }

    /// Merge the persisted graph snapshot from the cache into this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    pub async fn load_graph(&self) -> Result<()> {
        let stored = DependencyGraph::load(&self.remote.graph_snapshot_path()).await?;
        self.graph.merge(stored.snapshot());
        Ok(())
    }

    /// Merge this session's graph into the snapshot in the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be locked or written.
    pub async fn persist_graph(&self) -> Result<()> {
        self.graph.persist(&self.remote.graph_snapshot_path()).await
    }
}
