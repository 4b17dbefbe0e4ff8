//! Scan orchestration.
//!
//! [`Scanner`] owns one scan at a time: it validates input before any network
//! call, routes URL scans through the content fetcher and both scan modes
//! through the model client, and tracks progress in a single [`ScanState`].
//! Success and failure are variants of the same state, so a result and an
//! error can never coexist.

use codeguardian_core::SecurityAnalysis;
use log::debug;
use reqwest::Url;
use tokio::sync::RwLock;

use crate::fetch::{ContentFetcher, FetchError};
use crate::llm::{ModelClient, ModelError};
use crate::prompts::AuditPayload;

/// Progress of the current scan.
///
/// Idle -> Loading -> {Success, Failed}; starting a new scan discards the
/// previous terminal state and re-enters Loading.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Idle,
    Loading,
    Success(SecurityAnalysis),
    Failed(String),
}

impl ScanState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ScanState::Loading)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("API key is not configured. Please set the GEMINI_API_KEY environment variable.")]
    MissingApiKey,

    #[error("Code input cannot be empty.")]
    EmptyCode,

    #[error("URL input cannot be empty.")]
    EmptyUrl,

    #[error("Invalid URL provided. Please include http:// or https://")]
    InvalidUrl,

    #[error("Failed to analyze code. {0}")]
    CodeAnalysis(#[source] ModelError),

    #[error(
        "Failed to analyze URL. This could be due to a network issue or the target website blocking automated requests. Details: {0}"
    )]
    UrlAnalysis(#[source] UrlScanCause),
}

/// What went wrong between fetching a URL and getting an analysis back.
#[derive(Debug, thiserror::Error)]
pub enum UrlScanCause {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("The fetcher returned empty content.")]
    EmptyContent,

    #[error(transparent)]
    Model(#[from] ModelError),
}

struct Shared {
    state: ScanState,
    epoch: u64,
}

/// Orchestrates one scan against an injected model client and fetcher.
///
/// Every scan takes a monotonically increasing ticket when it enters Loading;
/// a settlement whose ticket is stale (a newer scan has started since) is
/// discarded instead of overwriting the newer state.
pub struct Scanner<M, F> {
    model: M,
    fetcher: F,
    api_key: Option<String>,
    shared: RwLock<Shared>,
}

impl<M: ModelClient, F: ContentFetcher> Scanner<M, F> {
    pub fn new(model: M, fetcher: F, api_key: Option<String>) -> Self {
        Self {
            model,
            fetcher,
            api_key,
            shared: RwLock::new(Shared {
                state: ScanState::Idle,
                epoch: 0,
            }),
        }
    }

    /// Snapshot of the current scan state.
    pub async fn state(&self) -> ScanState {
        self.shared.read().await.state.clone()
    }

    /// Audit a pasted code snippet.
    ///
    /// Fails without any network call when the API key is unset or the code
    /// is blank. The state is settled on every exit path.
    pub async fn scan_code(
        &self,
        code: &str,
        language: &str,
    ) -> Result<SecurityAnalysis, ScanError> {
        let ticket = self.begin().await;
        let outcome = self.run_code_scan(code, language).await;
        self.settle(ticket, &outcome).await;
        outcome
    }

    /// Fetch a website and audit its source.
    pub async fn scan_url(&self, url: &str) -> Result<SecurityAnalysis, ScanError> {
        let ticket = self.begin().await;
        let outcome = self.run_url_scan(url).await;
        self.settle(ticket, &outcome).await;
        outcome
    }

    async fn run_code_scan(
        &self,
        code: &str,
        language: &str,
    ) -> Result<SecurityAnalysis, ScanError> {
        self.require_api_key()?;

        if code.trim().is_empty() {
            return Err(ScanError::EmptyCode);
        }

        let payload = AuditPayload::Code {
            code: code.to_string(),
            language: language.to_string(),
        };
        self.model
            .analyze(&payload)
            .await
            .map_err(ScanError::CodeAnalysis)
    }

    async fn run_url_scan(&self, url: &str) -> Result<SecurityAnalysis, ScanError> {
        self.require_api_key()?;

        if url.trim().is_empty() {
            return Err(ScanError::EmptyUrl);
        }

        let validated = Url::parse(url.trim()).map_err(|_| ScanError::InvalidUrl)?;

        let html = self
            .fetcher
            .fetch_url_content(validated.as_str())
            .await
            .map_err(|e| ScanError::UrlAnalysis(e.into()))?;

        if html.trim().is_empty() {
            return Err(ScanError::UrlAnalysis(UrlScanCause::EmptyContent));
        }

        let payload = AuditPayload::Site { html };
        self.model
            .analyze(&payload)
            .await
            .map_err(|e| ScanError::UrlAnalysis(e.into()))
    }

    fn require_api_key(&self) -> Result<(), ScanError> {
        match &self.api_key {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ScanError::MissingApiKey),
        }
    }

    /// Enter Loading, discarding any previous result or error, and take the
    /// ticket for this scan.
    async fn begin(&self) -> u64 {
        let mut shared = self.shared.write().await;
        shared.epoch += 1;
        shared.state = ScanState::Loading;
        shared.epoch
    }

    /// Leave Loading with a terminal state, unless a newer scan has started.
    async fn settle(&self, ticket: u64, outcome: &Result<SecurityAnalysis, ScanError>) {
        let mut shared = self.shared.write().await;
        if shared.epoch != ticket {
            debug!("discarding stale scan settlement (ticket {ticket}, epoch {})", shared.epoch);
            return;
        }
        shared.state = match outcome {
            Ok(analysis) => ScanState::Success(analysis.clone()),
            Err(e) => ScanState::Failed(e.to_string()),
        };
    }
}
