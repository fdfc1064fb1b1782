//! Application configuration
//!
//! Everything the services need from the environment is read once, at
//! startup, into these structs. Nothing below reads the environment again.

use std::path::PathBuf;

use chrono_tz::Tz;
use invest_core::ReportType;
use invest_llm::ProviderConfig;
use serde::Serialize;
use url::Url;

pub const DEFAULT_DATABASE_PATH: &str = "data/investment.db";
pub const DEFAULT_SERVER_PORT: u16 = 3001;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Seoul;

/// Named slot of the report schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduleSlot {
    MorningReport,
    EveningReport,
    MiddayReport,
    WeeklyOutlook,
    NewsCollection,
}

impl ScheduleSlot {
    /// Job name used in logs
    pub fn job_name(&self) -> &'static str {
        match self {
            ScheduleSlot::MorningReport => "morning-report",
            ScheduleSlot::EveningReport => "evening-report",
            ScheduleSlot::MiddayReport => "midday-report",
            ScheduleSlot::WeeklyOutlook => "weekly-outlook",
            ScheduleSlot::NewsCollection => "news-collection-only",
        }
    }

    /// Short label used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            ScheduleSlot::MorningReport => "morning",
            ScheduleSlot::EveningReport => "evening",
            ScheduleSlot::MiddayReport => "midday",
            ScheduleSlot::WeeklyOutlook => "weekly",
            ScheduleSlot::NewsCollection => "news",
        }
    }
}

/// One cron-triggered job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub slot: ScheduleSlot,
    /// Five-field cron expression (minute hour day month weekday)
    pub cron: String,
    /// Human readable schedule
    #[serde(rename = "schedule")]
    pub description: String,
    /// Report generated by this entry; `None` runs news collection only
    pub report_type: Option<ReportType>,
    pub enabled: bool,
}

impl ScheduleEntry {
    fn new(
        slot: ScheduleSlot,
        cron: &str,
        description: &str,
        report_type: Option<ReportType>,
        enabled: bool,
    ) -> Self {
        Self {
            slot,
            cron: cron.to_string(),
            description: description.to_string(),
            report_type,
            enabled,
        }
    }
}

/// Optional schedule entries, off by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleToggles {
    pub midday_report: bool,
    pub weekly_report: bool,
    pub periodic_news_collection: bool,
}

/// Timezone and job table for the report scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub timezone: Tz,
    pub entries: Vec<ScheduleEntry>,
    /// When set, notifications carry a webhook payload
    pub notification_webhook: Option<Url>,
}

impl SchedulerConfig {
    pub fn new(timezone: Tz, toggles: ScheduleToggles) -> Self {
        let entries = vec![
            ScheduleEntry::new(
                ScheduleSlot::MorningReport,
                "0 8 * * *",
                "매일 오전 8시",
                Some(ReportType::Morning),
                true,
            ),
            ScheduleEntry::new(
                ScheduleSlot::EveningReport,
                "0 18 * * *",
                "매일 오후 6시",
                Some(ReportType::Evening),
                true,
            ),
            ScheduleEntry::new(
                ScheduleSlot::MiddayReport,
                "0 12 * * *",
                "매일 정오 12시",
                Some(ReportType::Morning),
                toggles.midday_report,
            ),
            ScheduleEntry::new(
                ScheduleSlot::WeeklyOutlook,
                "0 19 * * 0",
                "매주 일요일 오후 7시",
                Some(ReportType::Evening),
                toggles.weekly_report,
            ),
            ScheduleEntry::new(
                ScheduleSlot::NewsCollection,
                "0 */2 * * *",
                "2시간마다 뉴스 수집",
                None,
                toggles.periodic_news_collection,
            ),
        ];

        Self {
            timezone,
            entries,
            notification_webhook: None,
        }
    }

    pub fn with_notification_webhook(mut self, url: Option<Url>) -> Self {
        self.notification_webhook = url;
        self
    }

    pub fn enabled_entries(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter().filter(|e| e.enabled)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE, ScheduleToggles::default())
    }
}

/// Complete runtime configuration of the server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub server_port: u16,
    pub gemini: Option<ProviderConfig>,
    pub openai: Option<ProviderConfig>,
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Expects (all optional):
    /// - DATABASE_PATH, SERVER_PORT
    /// - GEMINI_API_KEY, GEMINI_BASE_URL, GEMINI_MODEL
    /// - OPENAI_API_KEY, OPENAI_BASE_URL, OPENAI_MODEL
    /// - ENABLE_MIDDAY_REPORT, ENABLE_WEEKLY_REPORT, ENABLE_PERIODIC_NEWS_COLLECTION
    /// - NOTIFICATION_WEBHOOK_URL, SCHEDULER_TIMEZONE
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str| var(key).as_deref() == Some("true");

        let server_port = match var("SERVER_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: "SERVER_PORT".to_string(),
                error: format!("not a port number: {}", raw),
            })?,
            None => DEFAULT_SERVER_PORT,
        };

        let timezone = match var("SCHEDULER_TIMEZONE") {
            Some(raw) => raw.parse::<Tz>().map_err(|e| ConfigError::InvalidValue {
                field: "SCHEDULER_TIMEZONE".to_string(),
                error: e.to_string(),
            })?,
            None => DEFAULT_TIMEZONE,
        };

        let notification_webhook = match var("NOTIFICATION_WEBHOOK_URL") {
            Some(raw) => Some(Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                field: "NOTIFICATION_WEBHOOK_URL".to_string(),
                error: e.to_string(),
            })?),
            None => None,
        };

        let provider = |key_var: &str,
                        base_var: &str,
                        model_var: &str,
                        make: fn(String) -> ProviderConfig| {
            var(key_var).map(|key| {
                let mut config = make(key);
                if let Some(base) = var(base_var) {
                    config = config.with_base_url(&base);
                }
                if let Some(model) = var(model_var) {
                    config = config.with_model(&model);
                }
                config
            })
        };

        let toggles = ScheduleToggles {
            midday_report: flag("ENABLE_MIDDAY_REPORT"),
            weekly_report: flag("ENABLE_WEEKLY_REPORT"),
            periodic_news_collection: flag("ENABLE_PERIODIC_NEWS_COLLECTION"),
        };

        Ok(Self {
            database_path: var("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
                .into(),
            server_port,
            gemini: provider(
                "GEMINI_API_KEY",
                "GEMINI_BASE_URL",
                "GEMINI_MODEL",
                |key| ProviderConfig::gemini(key),
            ),
            openai: provider(
                "OPENAI_API_KEY",
                "OPENAI_BASE_URL",
                "OPENAI_MODEL",
                |key| ProviderConfig::openai(key),
            ),
            scheduler: SchedulerConfig::new(timezone, toggles)
                .with_notification_webhook(notification_webhook),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value in {field}: {error}")]
    InvalidValue { field: String, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.server_port, 3001);
        assert!(config.gemini.is_none());
        assert!(config.openai.is_none());
        assert_eq!(config.scheduler.timezone, chrono_tz::Asia::Seoul);
        assert!(config.scheduler.notification_webhook.is_none());

        let enabled: Vec<_> = config.scheduler.enabled_entries().map(|e| e.slot).collect();
        assert_eq!(
            enabled,
            vec![ScheduleSlot::MorningReport, ScheduleSlot::EveningReport]
        );
    }

    #[test]
    fn test_toggles_require_literal_true() {
        let config = config_from(&[
            ("ENABLE_MIDDAY_REPORT", "true"),
            ("ENABLE_WEEKLY_REPORT", "1"),
            ("ENABLE_PERIODIC_NEWS_COLLECTION", "true"),
        ])
        .unwrap();

        let enabled: Vec<_> = config.scheduler.enabled_entries().map(|e| e.slot).collect();
        assert!(enabled.contains(&ScheduleSlot::MiddayReport));
        assert!(!enabled.contains(&ScheduleSlot::WeeklyOutlook));
        assert!(enabled.contains(&ScheduleSlot::NewsCollection));
    }

    #[test]
    fn test_provider_overrides() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "g-key"),
            ("GEMINI_MODEL", "gemini-test"),
            ("OPENAI_API_KEY", "o-key"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
        ])
        .unwrap();

        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key, "g-key");
        assert_eq!(gemini.model, "gemini-test");

        let openai = config.openai.unwrap();
        assert_eq!(openai.base_url, "http://localhost:8080/v1");
        assert_eq!(openai.model, invest_llm::provider::OPENAI_MODEL);
    }

    #[test]
    fn test_blank_key_is_unset() {
        let config = config_from(&[("OPENAI_API_KEY", "  ")]).unwrap();
        assert!(config.openai.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("SERVER_PORT", "http")]).is_err());
        assert!(config_from(&[("SCHEDULER_TIMEZONE", "Mars/Olympus")]).is_err());
        assert!(config_from(&[("NOTIFICATION_WEBHOOK_URL", "not a url")]).is_err());

        let config = config_from(&[
            ("SCHEDULER_TIMEZONE", "UTC"),
            ("NOTIFICATION_WEBHOOK_URL", "https://hooks.example.com/x"),
        ])
        .unwrap();
        assert_eq!(config.scheduler.timezone, chrono_tz::UTC);
        assert!(config.scheduler.notification_webhook.is_some());
    }

    #[test]
    fn test_weekly_entry_runs_evening_report() {
        let config = SchedulerConfig::default();
        let weekly = config
            .entries
            .iter()
            .find(|e| e.slot == ScheduleSlot::WeeklyOutlook)
            .unwrap();
        assert_eq!(weekly.cron, "0 19 * * 0");
        assert_eq!(weekly.report_type, Some(ReportType::Evening));
        assert!(!weekly.enabled);
    }
}
