//! Error types for completion provider calls

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider answered HTTP 429
    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No content in completion response")]
    EmptyResponse,
}
