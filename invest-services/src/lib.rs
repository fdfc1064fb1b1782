//! Business logic services for the investment helper
//!
//! This crate owns persistence, news collection, report generation, the
//! cron scheduler and the runtime test harness used by the HTTP API.

pub mod config;
pub mod news_service;
pub mod report_service;
pub mod scheduler;
pub mod storage;
pub mod testing_service;

pub use config::{AppConfig, ConfigError, ScheduleEntry, ScheduleSlot, ScheduleToggles, SchedulerConfig};
pub use news_service::{CollectionSummary, CollectorConfig, NewsService, NewsServiceError};
pub use report_service::ReportService;
pub use scheduler::{ManualReport, ReportScheduler, SchedulerError, SchedulerStatus};
pub use storage::{ReportCounts, Storage, StorageError};
pub use testing_service::{
    scenario_catalog, suite_descriptions, suite_names, validate_report, HealthStatus,
    SystemHealth, TestingService,
};
