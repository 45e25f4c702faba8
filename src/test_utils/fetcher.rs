//! In-memory [`Fetcher`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::Fetcher;
use crate::core::FetchFailure;

/// Serves documents keyed by URL path, e.g. `/math/const.glsl`.
///
/// Unknown paths answer with status 404. Clones share their request
/// counters, so a test can keep a clone after handing one to a resolver.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, String>,
    failures: HashMap<String, FetchFailure>,
    latency: Option<Duration>,
    requests: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl StaticFetcher {
    /// An empty fetcher: every request is a 404.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `path`.
    #[must_use]
    pub fn with_document(mut self, path: &str, content: &str) -> Self {
        self.documents.insert(path.to_string(), content.to_string());
        self
    }

    /// Fail every request for `path` with `failure`.
    #[must_use]
    pub fn with_failure(mut self, path: &str, failure: FetchFailure) -> Self {
        self.failures.insert(path.to_string(), failure);
        self
    }

    /// Delay every response by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Most requests that were ever being served at the same time.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// URLs requested so far, in arrival order.
    #[must_use]
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().map(|urls| urls.clone()).unwrap_or_default()
    }
}

/// Path part of `url`: everything from the first `/` after the host.
fn url_path(url: &str) -> &str {
    url.split_once("://")
        .and_then(|(_, rest)| rest.find('/').map(|index| &rest[index..]))
        .unwrap_or(url)
}

impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchFailure> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut urls) = self.requested.lock() {
            urls.push(url.to_string());
        }

        if let Some(latency) = self.latency {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        let path = url_path(url);
        if let Some(failure) = self.failures.get(path) {
            return Err(failure.clone());
        }
        self.documents.get(path).cloned().ok_or(FetchFailure::Status(404))
    }
}
