//! Cache-backed store for documents of the remote shader library.
//!
//! The store serves virtual pathnames (`/math/const.glsl`) from an on-disk
//! cache whose layout mirrors the remote namespace:
//!
//! ```text
//! .lygia-cache/
//! ├── math/
//! │   └── const.glsl          <- https://lygia.xyz/math/const.glsl
//! ├── color/space/
//! │   └── rgb2hsv.glsl        <- https://lygia.xyz/color/space/rgb2hsv.glsl
//! ├── .graph.json             (dependency graph snapshot, see resolver)
//! └── .locks/                 (cross-process lock files)
//! ```
//!
//! # Lookup flow
//!
//! 1. **Cache hit**: the file under the cache root is returned as-is
//! 2. **Miss**: a per-path async lock is taken and the cache re-checked, so
//!    concurrent requests for the same path wait for one fetch instead of
//!    issuing their own
//! 3. **Fetch**: `GET {remote_base}{virtual_path}` bounded by the configured
//!    timeout, retried with backoff on transient failures only
//! 4. **Persist**: the body is written atomically; parent directories are
//!    created idempotently
//!
//! A cache entry, once written, is authoritative: it is never re-fetched while
//! it exists. Removing it (or running `lygia cache clean`) forces a refetch.
//!
//! If persisting fails the fetched content is still returned and kept in
//! memory for the rest of the session; the failure is logged as a warning.

pub mod fetcher;
pub mod lock;

pub use fetcher::{Fetcher, HttpFetcher};
pub use lock::CacheLock;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio_retry::RetryIf;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::constants::GRAPH_SNAPSHOT_FILE;
use crate::core::{FetchFailure, IncludeError, Result};
use crate::directive::VirtualPath;
use crate::utils::backoff::fetch_backoff;
use crate::utils::fs::atomic_write;

/// Summary of the documents currently held in the cache directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheInfo {
    /// Number of cached library documents
    pub documents: usize,
    /// Total size of cached library documents in bytes
    pub bytes: u64,
    /// Leftover temp files from writes that never reached their rename
    pub stale_temp_files: usize,
}

/// Serves library documents from the on-disk cache, fetching on miss.
///
/// The store is shared by every resolution running in a session: all methods
/// take `&self` and are safe to call concurrently.
pub struct RemoteStore<F: Fetcher = HttpFetcher> {
    /// Root directory mirroring the remote namespace
    root: PathBuf,
    /// Base URL virtual pathnames are appended to
    remote_base: String,
    fetcher: F,
    /// Upper bound for a single fetch attempt
    timeout: Duration,
    /// Retries after the first failed attempt (transient failures only)
    retries: u32,
    /// Per-path async locks serializing fetches of the same document.
    fetch_locks: DashMap<VirtualPath, Arc<Mutex<()>>>,
    /// Fetched documents whose cache write failed, served for the session.
    unpersisted: DashMap<VirtualPath, String>,
    /// Network fetch attempts performed by this store.
    fetches: AtomicUsize,
}

impl RemoteStore<HttpFetcher> {
    /// Create a store talking HTTPS to `config.remote_base`.
    ///
    /// # Errors
    ///
    /// Returns [`IncludeError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new()?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetcher> RemoteStore<F> {
    /// Create a store using a custom fetcher.
    pub fn with_fetcher(config: &ResolverConfig, fetcher: F) -> Self {
        Self {
            root: config.cache_dir.clone(),
            remote_base: config.remote_base.clone(),
            fetcher,
            timeout: config.fetch_timeout(),
            retries: config.fetch_retries,
            fetch_locks: DashMap::new(),
            unpersisted: DashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Override the per-attempt fetch timeout, longer or shorter than the
    /// configured one.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Root directory of the cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the persisted dependency graph snapshot.
    #[must_use]
    pub fn graph_snapshot_path(&self) -> PathBuf {
        self.root.join(GRAPH_SNAPSHOT_FILE)
    }

    /// Network fetch attempts performed so far (retries included).
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Whether `virtual_path` is served without a fetch: it has a cache entry
    /// on disk or is held in memory after a failed cache write.
    #[must_use]
    pub fn is_cached(&self, virtual_path: &VirtualPath) -> bool {
        virtual_path.cache_path(&self.root).is_file()
            || self.unpersisted.contains_key(virtual_path)
    }

    /// Return the raw content of a library document.
    ///
    /// No include processing happens here; recursion is the resolver's job.
    ///
    /// # Errors
    ///
    /// [`IncludeError::Fetch`] with the URL and cause when the document is not
    /// cached and cannot be fetched; [`IncludeError::Other`] for the namespace
    /// root, which is not a document.
    pub async fn get(&self, virtual_path: &VirtualPath) -> Result<String> {
        if virtual_path.is_root() {
            return Err(IncludeError::Other {
                message: "The library root is not a document".to_string(),
            });
        }

        if let Some(content) = self.lookup(virtual_path).await {
            debug!("Cache hit for {}", virtual_path);
            return Ok(content);
        }

        let fetch_lock = self
            .fetch_locks
            .entry(virtual_path.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = fetch_lock.lock().await;

        // Another task may have fetched it while we waited for the lock.
        if let Some(content) = self.lookup(virtual_path).await {
            debug!("Cache filled concurrently for {}", virtual_path);
            return Ok(content);
        }

        debug!("Cache miss for {}", virtual_path);
        let url = virtual_path.url(&self.remote_base);
        let content = self.fetch_with_retry(&url).await?;

        if let Err(e) = self.persist(virtual_path, &content).await {
            warn!("{e}; keeping the fetched document in memory for this session");
            self.unpersisted.insert(virtual_path.clone(), content.clone());
        }

        Ok(content)
    }

    /// Read the cache entry, falling back to documents that failed to persist.
    async fn lookup(&self, virtual_path: &VirtualPath) -> Option<String> {
        let path = virtual_path.cache_path(&self.root);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => return Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Ignoring unreadable cache entry {}: {}", path.display(), e),
        }
        self.unpersisted.get(virtual_path).map(|entry| entry.value().clone())
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let attempt = || async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            info!("Fetching {url}");
            match tokio::time::timeout(self.timeout, self.fetcher.fetch(url)).await {
                Ok(result) => result,
                Err(_) => Err(FetchFailure::Timeout(self.timeout)),
            }
        };

        let should_retry = |failure: &FetchFailure| {
            let transient = failure.is_transient();
            if transient {
                warn!("Fetching {url} failed ({failure}), retrying");
            }
            transient
        };

        RetryIf::spawn(fetch_backoff(self.retries), attempt, should_retry).await.map_err(|cause| {
            IncludeError::Fetch {
                url: url.to_string(),
                cause,
            }
        })
    }

    /// Write a fetched document to its cache entry.
    async fn persist(&self, virtual_path: &VirtualPath, content: &str) -> Result<()> {
        let path = virtual_path.cache_path(&self.root);
        atomic_write(&path, content.as_bytes()).await.map_err(|source| IncludeError::CacheWrite {
            path: path.clone(),
            source,
        })?;
        debug!("Cached {} at {}", virtual_path, path.display());
        Ok(())
    }

    /// Count cached documents and their total size.
    ///
    /// Hidden entries (the graph snapshot, lock files) are skipped. Temp files
    /// left behind by interrupted writes are counted separately.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be walked.
    pub async fn info(&self) -> Result<CacheInfo> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || scan_cache(&root))
            .await
            .map_err(|e| IncludeError::Other {
                message: format!("Cache scan task failed: {e}"),
            })?
    }

    /// Remove every cache entry, the graph snapshot and lock files.
    ///
    /// Returns what was removed. Documents held in memory for this session
    /// are dropped as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory exists but cannot be removed.
    pub async fn clean(&self) -> Result<CacheInfo> {
        let removed = self.info().await?;
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.unpersisted.clear();
        info!("Removed {} cached documents from {}", removed.documents, self.root.display());
        Ok(removed)
    }
}

fn scan_cache(root: &Path) -> Result<CacheInfo> {
    let mut info = CacheInfo::default();
    if !root.exists() {
        return Ok(info);
    }

    let walker = walkdir::WalkDir::new(root).min_depth(1).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.'))
    });

    for entry in walker {
        let entry = entry.map_err(|e| IncludeError::Other {
            message: format!("Failed to scan cache directory {}: {e}", root.display()),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            if name.ends_with(".tmp") {
                info.stale_temp_files += 1;
            }
            continue;
        }
        info.documents += 1;
        info.bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
    }

    Ok(info)
}
