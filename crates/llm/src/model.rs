//! Provider-neutral request and error types.

use async_trait::async_trait;

/// Which configured model serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// The main generation model.
    Primary,
    /// The smaller model used for short summaries.
    Summary,
}

/// A strict JSON schema the response must follow.
#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub name: &'static str,
    pub schema: serde_json::Value,
}

/// One single-turn model invocation.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub tier: ModelTier,
    pub system: String,
    pub prompt: String,
    pub output_schema: Option<OutputSchema>,
    /// Overrides the configured token cap.
    pub max_tokens: Option<u32>,
}

/// Errors from a model provider.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Model provider error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A 2xx response without any text content.
    #[error("Model provider returned no content")]
    EmptyResponse,
}

impl LlmError {
    /// Upstream HTTP status, when the provider sent one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::EmptyResponse => None,
        }
    }
}

/// A text-completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one completion and return the raw text output.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
