//! Network access for the remote content store.
//!
//! [`Fetcher`] is the seam between the store and the network. The store only
//! needs "GET this URL, give me the whole body as text"; [`HttpFetcher`]
//! implements that with `reqwest`, and tests substitute in-memory fetchers.
//!
//! Fetchers do not bound request time themselves; the store wraps every
//! attempt in its own timeout.

use std::future::Future;

use crate::core::{FetchFailure, IncludeError, Result};

/// Retrieves whole text documents by URL.
pub trait Fetcher: Send + Sync {
    /// GET `url` and return the response body.
    ///
    /// Non-success statuses must be reported as [`FetchFailure::Status`];
    /// everything that prevents a response from arriving is
    /// [`FetchFailure::Transport`] or [`FetchFailure::Timeout`].
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<String, FetchFailure>> + Send;
}

/// HTTPS fetcher backed by a shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the crate's user agent.
    ///
    /// # Errors
    ///
    /// [`IncludeError::Config`] if the HTTP client cannot be initialized
    /// (for example when no TLS backend is available).
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lygia-resolver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IncludeError::Config {
                message: format!("Failed to initialize HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        response.text().await.map_err(transport)
    }
}

fn transport(error: reqwest::Error) -> FetchFailure {
    FetchFailure::Transport(error.to_string())
}
