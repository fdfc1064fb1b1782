//! Report Scheduler
//!
//! Registers the enabled schedule entries with a cron scheduler and runs the
//! report pipeline for each trigger. Scheduled runs log their outcome and
//! never propagate errors; manual runs return them to the caller.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, instrument};

use invest_core::{InvestResult, Report, ReportType};

use crate::config::{ScheduleEntry, ScheduleSlot, SchedulerConfig};
use crate::news_service::NewsService;
use crate::report_service::ReportService;

/// Result of a manually triggered report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualReport {
    pub success: bool,
    pub report: Report,
    /// Wall time in whole seconds
    pub duration: u64,
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub trigger: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// Outcome of a scheduled report run, as logged and sent to the webhook
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub report_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Schedule table with the scheduler clock
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    #[serde(flatten)]
    pub jobs: BTreeMap<ScheduleSlot, ScheduleEntry>,
    pub timezone: String,
    pub current_time: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Scheduler error: {0}")]
    Job(String),
}

/// Cron-driven report scheduler
pub struct ReportScheduler {
    reports: Arc<ReportService>,
    news: Arc<NewsService>,
    config: SchedulerConfig,
    scheduler: Mutex<Option<JobScheduler>>,
}

impl ReportScheduler {
    pub fn new(reports: Arc<ReportService>, news: Arc<NewsService>, config: SchedulerConfig) -> Self {
        Self {
            reports,
            news,
            config,
            scheduler: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Register every enabled entry and start ticking
    pub async fn start(self: &Arc<Self>) -> Result<(), SchedulerError> {
        let scheduler = JobScheduler::new().await.map_err(job_error)?;

        for entry in self.config.enabled_entries() {
            let this = Arc::clone(self);
            let job_entry = entry.clone();

            let job = Job::new_async_tz(
                job_expression(&entry.cron).as_str(),
                self.config.timezone,
                move |_id, _scheduler| {
                    let this = Arc::clone(&this);
                    let entry = job_entry.clone();
                    Box::pin(async move {
                        this.run_entry(&entry).await;
                    })
                },
            )
            .map_err(job_error)?;

            scheduler.add(job).await.map_err(job_error)?;
            info!(
                "Registered {} ({}, {})",
                entry.slot.job_name(),
                entry.cron,
                self.config.timezone.name()
            );
        }

        scheduler.start().await.map_err(job_error)?;
        *self.scheduler.lock().await = Some(scheduler);

        info!("Report scheduler started");
        Ok(())
    }

    pub async fn shutdown(&self) {
        if let Some(mut scheduler) = self.scheduler.lock().await.take() {
            if let Err(e) = scheduler.shutdown().await {
                error!("Failed to stop scheduler: {:?}", e);
            }
        }
    }

    /// Execute one scheduled entry. Report runs return their notification.
    pub async fn run_entry(&self, entry: &ScheduleEntry) -> Option<Notification> {
        let Some(report_type) = entry.report_type else {
            info!("Periodic news collection started");
            let summary = self.news.collect().await;
            info!(
                "Periodic news collection finished: {} new items",
                summary.items_collected
            );
            return None;
        };

        info!("Scheduled {} started", entry.slot.job_name());
        let start = Instant::now();

        let notification = match self.reports.generate(report_type).await {
            Ok(report) => {
                let duration = whole_seconds(start);
                info!(
                    "Scheduled {} finished in {}s - id {}",
                    entry.slot.job_name(),
                    duration,
                    report.id
                );
                Notification {
                    kind: NotificationKind::Success,
                    report_type: entry.slot.label(),
                    report_id: Some(report.id),
                    duration: Some(duration),
                    error: None,
                    timestamp: Utc::now(),
                }
            }
            Err(e) => {
                error!("Scheduled {} failed: {}", entry.slot.job_name(), e);
                Notification {
                    kind: NotificationKind::Error,
                    report_type: entry.slot.label(),
                    report_id: None,
                    duration: None,
                    error: Some(e.to_string()),
                    timestamp: Utc::now(),
                }
            }
        };

        self.notify(&notification);
        Some(notification)
    }

    /// Run the report pipeline on demand
    #[instrument(skip(self))]
    pub async fn generate_manual(&self, report_type: ReportType) -> InvestResult<ManualReport> {
        info!("Manual {} report requested", report_type);
        let start = Instant::now();

        let report = self.reports.generate(report_type).await.map_err(|e| {
            error!("Manual {} report failed: {}", report_type, e);
            e
        })?;

        let duration = whole_seconds(start);
        info!(
            "Manual {} report finished in {}s - id {}",
            report_type, duration, report.id
        );

        Ok(ManualReport {
            success: true,
            report,
            duration,
            generated_at: Utc::now(),
            trigger: "manual",
        })
    }

    /// Report entries keyed by slot; the news-collection entry is omitted
    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            jobs: self
                .config
                .entries
                .iter()
                .filter(|e| e.report_type.is_some())
                .map(|e| (e.slot, e.clone()))
                .collect(),
            timezone: self.config.timezone.name().to_string(),
            current_time: Utc::now(),
        }
    }

    fn notify(&self, notification: &Notification) {
        let label = notification.report_type.to_uppercase();
        match notification.kind {
            NotificationKind::Success => info!(
                "{} 리포트 생성 완료 - ID: {}, 소요시간: {}초",
                label,
                notification.report_id.unwrap_or_default(),
                notification.duration.unwrap_or_default()
            ),
            NotificationKind::Error => error!(
                "{} 리포트 생성 실패 - 오류: {}",
                label,
                notification.error.as_deref().unwrap_or_default()
            ),
        }

        // Webhook delivery is log-only
        if let Some(url) = &self.config.notification_webhook {
            match serde_json::to_string(notification) {
                Ok(payload) => debug!(webhook = %url, "Webhook notification: {}", payload),
                Err(e) => error!("Failed to encode webhook notification: {}", e),
            }
        }
    }
}

fn job_error(err: impl std::fmt::Debug) -> SchedulerError {
    SchedulerError::Job(format!("{:?}", err))
}

fn whole_seconds(start: Instant) -> u64 {
    start.elapsed().as_secs_f64().round() as u64
}

/// Six-field job expression for a five-field cron line: a zero seconds
/// field is prepended and numeric weekdays become names (0 and 7 are Sunday).
fn job_expression(cron: &str) -> String {
    const WEEKDAYS: [&str; 8] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

    let mut fields: Vec<String> = cron.split_whitespace().map(str::to_string).collect();
    if let Some(weekday) = fields.get_mut(4) {
        if let Some(name) = weekday.parse::<usize>().ok().and_then(|n| WEEKDAYS.get(n)) {
            *weekday = name.to_string();
        }
    }
    format!("0 {}", fields.join(" "))
}
