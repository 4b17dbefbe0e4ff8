//! Server-side retrieval of user-supplied URLs.
//!
//! This is the only egress point that can reach arbitrary hosts. The fetcher
//! sends an identifying user agent so target sites can tell the scanner apart
//! from a browser, and gives up after a fixed timeout.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

/// Fetches the raw source of a website on behalf of a scan.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_url_content(&self, url: &str) -> Result<String, FetchError>;
}

/// Failure classification for a URL fetch.
///
/// Mirrors the three ways an HTTP request can go wrong: the server answered
/// with a non-success status, the request left but nothing came back, or the
/// request could not be constructed at all.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("The 'url' argument must be a non-empty string.")]
    InvalidArgument,

    #[error("The server responded with status code: {0}.")]
    Status(u16),

    #[error("The request was made but no response was received from the server.")]
    NoResponse,

    #[error("Error setting up the request: {0}.")]
    Request(String),
}

/// HTTP implementation of [`ContentFetcher`] on a shared `reqwest` client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch_url_content(&self, url: &str) -> Result<String, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::InvalidArgument);
        }

        debug!("fetching content from {url}");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("fetch failed for {url}: {e}");
            if e.is_builder() {
                FetchError::Request(e.to_string())
            } else {
                FetchError::NoResponse
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("fetch for {url} returned status {status}");
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(|_| FetchError::NoResponse)
    }
}
