//! Investment analysis client
//!
//! Wraps two OpenAI-compatible chat completion providers (Gemini as primary,
//! OpenAI as secondary) behind a single text-generation primitive with bounded
//! rate-limit retries, provider fallback and a static fallback report.

pub mod client;
pub mod error;
pub mod prompts;
pub mod provider;

pub use client::{
    Analysis, AnalysisClient, CallOutcome, RetryPolicy, DEFAULT_TIMEZONE, MIN_ANALYSIS_CHARS,
};
pub use error::LlmError;
pub use provider::{CompletionProvider, OpenAiCompatProvider, ProviderConfig};
