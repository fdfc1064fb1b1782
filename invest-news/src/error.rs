//! Error types for the news module

use thiserror::Error;

/// Errors that can occur while fetching or parsing a feed
#[derive(Debug, Error)]
pub enum NewsError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Feed host returned an error response
    #[error("Feed error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Body was neither RSS nor Atom
    #[error("Parse error: {0}")]
    ParseError(String),
}
