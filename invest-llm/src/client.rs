//! Analysis client with bounded retry and provider fallback

use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use invest_core::NewsItem;
use tracing::{debug, error, info, instrument, warn};

use crate::error::LlmError;
use crate::prompts;
use crate::provider::{CompletionProvider, OpenAiCompatProvider, ProviderConfig};

/// Generated text shorter than this is treated as a failed call
pub const MIN_ANALYSIS_CHARS: usize = 100;

/// Timezone used to date the fallback report unless overridden
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;

/// Backoff settings for rate-limited calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed on the same provider after HTTP 429
    pub max_retries: u32,
    /// Wait before the first retry; doubled for every further retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `attempt + 1`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Result of a single provider call
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Success(String),
    RateLimited,
    ProviderError(String),
}

impl CallOutcome {
    fn from_result(result: Result<String, LlmError>) -> Self {
        match result {
            Ok(text) if text.chars().count() >= MIN_ANALYSIS_CHARS => CallOutcome::Success(text),
            Ok(text) => CallOutcome::ProviderError(format!(
                "generated analysis too short ({} chars)",
                text.chars().count()
            )),
            Err(LlmError::RateLimited) => CallOutcome::RateLimited,
            Err(e) => CallOutcome::ProviderError(e.to_string()),
        }
    }
}

/// Terminal result of an analysis run
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Completed {
        text: String,
        provider: String,
        /// Provider calls made, including the successful one
        calls: u32,
    },
    Exhausted {
        reason: String,
        calls: u32,
    },
}

impl Analysis {
    /// Generated text, or the static fallback report dated in `tz`
    pub fn into_text(self, tz: Tz) -> String {
        match self {
            Analysis::Completed { text, .. } => text,
            Analysis::Exhausted { .. } => prompts::fallback_message(tz),
        }
    }

    pub fn calls(&self) -> u32 {
        match self {
            Analysis::Completed { calls, .. } | Analysis::Exhausted { calls, .. } => *calls,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Primary,
    Secondary,
}

/// Single text-generation primitive used by report generation
#[derive(Clone)]
pub struct AnalysisClient {
    primary: Option<Arc<dyn CompletionProvider>>,
    secondary: Option<Arc<dyn CompletionProvider>>,
    policy: RetryPolicy,
    timezone: Tz,
}

impl AnalysisClient {
    pub fn new(
        primary: Option<Arc<dyn CompletionProvider>>,
        secondary: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self {
            primary,
            secondary,
            policy: RetryPolicy::default(),
            timezone: DEFAULT_TIMEZONE,
        }
    }

    /// Build HTTP providers from optional connection settings
    pub fn from_configs(primary: Option<ProviderConfig>, secondary: Option<ProviderConfig>) -> Self {
        let build = |config: ProviderConfig| -> Arc<dyn CompletionProvider> {
            Arc::new(OpenAiCompatProvider::new(config))
        };
        Self::new(primary.map(build), secondary.map(build))
    }

    /// Client without providers; every call yields the fallback report
    pub fn unconfigured() -> Self {
        Self::new(None, None)
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Date the fallback report in `tz`, matching report titles
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .map(|p| format!("{} ({})", p.name(), p.model()))
            .collect()
    }

    /// Generate text for `prompt`, preferring the primary provider
    pub async fn analyze(&self, prompt: &str) -> String {
        self.analyze_with(prompt, true).await
    }

    pub async fn analyze_with(&self, prompt: &str, prefer_primary: bool) -> String {
        let analysis = self.run(prompt, prefer_primary).await;
        if let Analysis::Exhausted { reason, .. } = &analysis {
            debug!(
                "Analysis exhausted after {} provider calls: {}",
                analysis.calls(),
                reason
            );
        }
        analysis.into_text(self.timezone)
    }

    /// Drive providers until one succeeds or the retry budget is spent.
    ///
    /// A rate-limited provider is retried up to `max_retries` times with
    /// exponential backoff. Any other failure of the primary on its first
    /// attempt switches to the secondary once. Everything else ends the run.
    #[instrument(skip(self, prompt), fields(prompt_chars = prompt.chars().count()))]
    pub async fn run(&self, prompt: &str, prefer_primary: bool) -> Analysis {
        let mut slot = if prefer_primary && self.primary.is_some() {
            Slot::Primary
        } else {
            Slot::Secondary
        };
        let mut attempt: u32 = 0;
        let mut calls: u32 = 0;

        loop {
            let Some(provider) = self.provider(slot) else {
                warn!("No completion provider configured, returning fallback report");
                return Analysis::Exhausted {
                    reason: "no provider configured".to_string(),
                    calls,
                };
            };

            info!(
                "Investment analysis with {} ({}) attempt {}",
                provider.name(),
                provider.model(),
                attempt + 1
            );
            calls += 1;

            let outcome =
                CallOutcome::from_result(provider.complete(prompts::SYSTEM_PROMPT, prompt).await);

            match outcome {
                CallOutcome::Success(text) => {
                    info!("Investment analysis completed by {}", provider.name());
                    return Analysis::Completed {
                        text,
                        provider: provider.name().to_string(),
                        calls,
                    };
                }
                CallOutcome::RateLimited if attempt < self.policy.max_retries => {
                    let wait = self.policy.backoff(attempt);
                    warn!(
                        "{} rate limited, retrying in {}ms",
                        provider.name(),
                        wait.as_millis()
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                failure => {
                    let reason = match failure {
                        CallOutcome::ProviderError(message) => message,
                        _ => "rate limit retries exhausted".to_string(),
                    };
                    error!(
                        "{} failed on attempt {}: {}",
                        provider.name(),
                        attempt + 1,
                        reason
                    );

                    if slot == Slot::Primary && attempt == 0 && self.secondary.is_some() {
                        warn!("Primary provider failed, falling back to secondary");
                        slot = Slot::Secondary;
                        continue;
                    }

                    error!("All analysis attempts failed, returning fallback report");
                    return Analysis::Exhausted { reason, calls };
                }
            }
        }
    }

    fn provider(&self, slot: Slot) -> Option<&Arc<dyn CompletionProvider>> {
        match slot {
            Slot::Primary => self.primary.as_ref(),
            Slot::Secondary => self.secondary.as_ref(),
        }
    }

    /// Digest of the given news items; canned text when there are none
    pub async fn summarize_news(&self, items: &[NewsItem]) -> String {
        if items.is_empty() {
            return prompts::NO_NEWS_ANALYSIS.to_string();
        }
        self.analyze(&prompts::news_digest(items)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Datelike, Utc};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct ScriptedProvider {
        name: &'static str,
        script: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn new(name: &'static str, script: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse))
        }
    }

    fn long_text(tag: &str) -> String {
        format!("{} {}", tag, "분석 내용입니다. ".repeat(20))
    }

    fn client(
        primary: Option<Arc<ScriptedProvider>>,
        secondary: Option<Arc<ScriptedProvider>>,
    ) -> AnalysisClient {
        let as_dyn = |p: Arc<ScriptedProvider>| -> Arc<dyn CompletionProvider> { p };
        AnalysisClient::new(primary.map(as_dyn), secondary.map(as_dyn)).with_retry_policy(
            RetryPolicy {
                max_retries: 3,
                base_delay: Duration::from_millis(1),
            },
        )
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_unconfigured_returns_fallback_for_any_prompt() {
        let client = AnalysisClient::unconfigured();
        for prompt in ["", "짧은 프롬프트", "a much longer prompt about bonds and rates"] {
            let text = client.analyze(prompt).await;
            assert!(text.contains(prompts::SYSTEM_NOTICE_MARKER));
        }
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn test_primary_success() {
        let primary = ScriptedProvider::new("primary", vec![Ok(long_text("P"))]);
        let secondary = ScriptedProvider::new("secondary", vec![]);
        let client = client(Some(primary.clone()), Some(secondary.clone()));

        let analysis = client.run("prompt", true).await;
        assert!(matches!(analysis, Analysis::Completed { ref provider, calls: 1, .. } if provider == "primary"));
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_retries_same_provider() {
        let primary = ScriptedProvider::new(
            "primary",
            vec![
                Err(LlmError::RateLimited),
                Err(LlmError::RateLimited),
                Ok(long_text("P")),
            ],
        );
        let client = client(Some(primary.clone()), None);

        let text = client.analyze("prompt").await;
        assert!(text.starts_with("P "));
        assert_eq!(primary.calls(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion_returns_fallback() {
        let primary = ScriptedProvider::new(
            "primary",
            (0..10).map(|_| Err(LlmError::RateLimited)).collect(),
        );
        let secondary = ScriptedProvider::new("secondary", vec![Ok(long_text("S"))]);
        let client = client(Some(primary.clone()), Some(secondary.clone()));

        let analysis = client.run("prompt", true).await;
        assert!(matches!(analysis, Analysis::Exhausted { calls: 4, .. }));
        assert_eq!(primary.calls(), 4);
        assert_eq!(secondary.calls(), 0);
        assert!(analysis.into_text(DEFAULT_TIMEZONE).contains(prompts::SYSTEM_NOTICE_MARKER));
    }

    #[tokio::test]
    async fn test_primary_error_falls_back_to_secondary() {
        let primary = ScriptedProvider::new(
            "primary",
            vec![Err(LlmError::Api {
                status: 500,
                message: "boom".to_string(),
            })],
        );
        let secondary = ScriptedProvider::new("secondary", vec![Ok(long_text("S"))]);
        let client = client(Some(primary.clone()), Some(secondary.clone()));

        let analysis = client.run("prompt", true).await;
        assert!(matches!(analysis, Analysis::Completed { ref provider, calls: 2, .. } if provider == "secondary"));
    }

    #[tokio::test]
    async fn test_short_output_is_not_a_success() {
        let primary = ScriptedProvider::new("primary", vec![Ok("too short".to_string())]);
        let secondary = ScriptedProvider::new("secondary", vec![Ok("also short".to_string())]);
        let client = client(Some(primary), Some(secondary.clone()));

        let text = client.analyze("prompt").await;
        assert!(text.chars().count() >= MIN_ANALYSIS_CHARS);
        assert!(text.contains(prompts::SYSTEM_NOTICE_MARKER));
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_secondary_only_when_primary_missing() {
        let secondary = ScriptedProvider::new("secondary", vec![Ok(long_text("S"))]);
        let client = client(None, Some(secondary.clone()));

        assert!(client.analyze("prompt").await.starts_with("S "));
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_secondary_failure_does_not_loop_back() {
        let primary = ScriptedProvider::new("primary", vec![Err(LlmError::EmptyResponse)]);
        let secondary = ScriptedProvider::new("secondary", vec![Err(LlmError::EmptyResponse)]);
        let client = client(Some(primary.clone()), Some(secondary.clone()));

        let analysis = client.run("prompt", true).await;
        assert!(matches!(analysis, Analysis::Exhausted { calls: 2, .. }));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_summarize_empty_news_skips_providers() {
        let primary = ScriptedProvider::new("primary", vec![]);
        let client = client(Some(primary.clone()), None);

        assert_eq!(client.summarize_news(&[]).await, prompts::NO_NEWS_ANALYSIS);
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn test_fallback_is_dated_in_client_timezone() {
        let dated = |tz: Tz| {
            let date = Utc::now().with_timezone(&tz).date_naive();
            format!("{}. {}. {}.", date.year(), date.month(), date.day())
        };
        let east = chrono_tz::Pacific::Kiritimati;
        let west = chrono_tz::Etc::GMTPlus12;

        let text = AnalysisClient::unconfigured()
            .with_timezone(east)
            .analyze("prompt")
            .await;
        assert!(text.contains(&dated(east)), "{}", text);
        assert!(!text.contains(&dated(west)));

        let text = AnalysisClient::unconfigured()
            .with_timezone(west)
            .analyze("prompt")
            .await;
        assert!(text.contains(&dated(west)), "{}", text);
    }

    #[tokio::test]
    async fn test_exhausted_run_counts_every_call() {
        let primary = ScriptedProvider::new("primary", vec![Err(LlmError::EmptyResponse)]);
        let secondary = ScriptedProvider::new(
            "secondary",
            (0..4).map(|_| Err(LlmError::RateLimited)).collect(),
        );
        let client = client(Some(primary), Some(secondary.clone()));

        // One primary call, then the secondary's first call plus three retries
        let analysis = client.run("prompt", true).await;
        assert_eq!(analysis.calls(), 5);
        assert_eq!(secondary.calls(), 4);
    }
}
