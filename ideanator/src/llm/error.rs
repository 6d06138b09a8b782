//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Longest wait honoured from a `Retry-After` header
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(30);

/// Errors from a single model call
///
/// The pipeline never interprets these; they propagate to whoever started the
/// run. Only the HTTP client looks at [`LlmError::retry_delay`].
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM backend misconfigured: {0}")]
    Config(String),

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model returned no text content")]
    EmptyResponse,

    #[error("No reply within {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Transient failures worth another attempt
    ///
    /// A timeout is final: a local model that needed longer than the budget once
    /// will need it again.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } | LlmError::Network(_) => true,
            LlmError::ApiError { status, .. } => matches!(*status, 408 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// How long to wait before attempt number `attempt` (1-based)
    pub fn retry_delay(&self, attempt: u32, base: Duration) -> Duration {
        match self {
            LlmError::RateLimited { retry_after } => (*retry_after).min(MAX_RATE_LIMIT_WAIT),
            _ => base * 2u32.saturating_pow(attempt.saturating_sub(1)),
        }
    }
}
