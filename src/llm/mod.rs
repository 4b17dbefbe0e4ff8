//! Remote model client.
//!
//! All security judgment is delegated to a hosted LLM; this module owns the
//! single outbound model call per scan. The [`ModelClient`] trait is the seam
//! the orchestrator is generic over, so tests can substitute a double without
//! touching the network.

mod gemini;

use async_trait::async_trait;
use codeguardian_core::{AnalysisParseError, SecurityAnalysis};

use crate::prompts::AuditPayload;

pub use gemini::GeminiClient;

/// One audit request against the remote model.
///
/// Implementations perform exactly one call; a failure surfaces immediately
/// to the caller, there is no retry.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn analyze(&self, payload: &AuditPayload) -> Result<SecurityAnalysis, ModelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The remote call itself failed (missing or invalid credentials,
    /// network failure, upstream rejection).
    #[error("model request failed: {0}")]
    Request(#[from] genai::Error),

    /// The call succeeded but the completion carried no text.
    #[error("model returned no response text")]
    EmptyCompletion,

    /// The response text did not parse against the analysis schema.
    #[error(transparent)]
    Parse(#[from] AnalysisParseError),
}
