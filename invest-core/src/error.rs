//! Error types for the investment helper

use thiserror::Error;

/// Workspace-wide error type
#[derive(Error, Debug)]
pub enum InvestError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl InvestError {
    pub fn database(msg: impl Into<String>) -> Self {
        InvestError::Database(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        InvestError::Network(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        InvestError::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        InvestError::InvalidInput(msg.into())
    }
}

/// Result type alias for investment helper operations
pub type InvestResult<T> = Result<T, InvestError>;
