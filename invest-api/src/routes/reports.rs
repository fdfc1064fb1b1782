//! Report endpoints: listing, lookup, manual generation and the
//! manual batch-testing variants.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use invest_core::{NewsStats, Report, ReportStats, ReportType};
use invest_services::testing_service::{RunMetrics, TimedGeneration};
use invest_services::SchedulerStatus;

use super::{error_response, service_error};
use crate::AppState;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 10;

/// Query parameters for listing reports. Unparsable values fall back to
/// the defaults.
#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReportPage {
    reports: Vec<Report>,
    total: usize,
    page: usize,
    limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SystemInfo {
    current_time: chrono::DateTime<Utc>,
    timezone: String,
    environment: &'static str,
}

#[derive(Debug, Serialize)]
struct FlowStatus {
    news: NewsStats,
    reports: ReportStats,
    scheduler: SchedulerStatus,
    system: SystemInfo,
}

/// Create report routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/stats", get(get_stats))
        .route("/reports/scheduler/status", get(get_scheduler_status))
        .route("/reports/date/{date}", get(get_reports_by_date))
        .route("/reports/generate/{report_type}", post(generate_report))
        .route("/reports/test/generate/{report_type}", post(test_generate_report))
        .route("/reports/test/news/collect", post(test_collect_news))
        .route("/reports/test/flow/status", get(test_flow_status))
        .route("/reports/test/flow/full", post(test_full_flow))
        .route("/reports/{id}", get(get_report))
}

fn positive_or(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// GET /reports - Paginated reports, newest first
async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ReportsQuery>,
) -> impl IntoResponse {
    let page = positive_or(params.page.as_deref(), DEFAULT_PAGE);
    let limit = positive_or(params.limit.as_deref(), DEFAULT_LIMIT);

    match state.report_service.list(page, limit) {
        Ok((reports, total)) => (
            StatusCode::OK,
            Json(ReportPage {
                reports,
                total,
                page,
                limit,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to list reports: {}", e);
            service_error(e)
        }
    }
}

/// GET /reports/stats
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    match state.report_service.stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            error!("Failed to compute report stats: {}", e);
            service_error(e)
        }
    }
}

/// GET /reports/scheduler/status
async fn get_scheduler_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.scheduler.status())
}

/// GET /reports/{id}
async fn get_report(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let Ok(id) = id.parse::<i64>() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed (numeric string is expected)",
        );
    };

    match state.report_service.get(id) {
        Ok(Some(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("Report {} not found", id)),
        Err(e) => {
            error!("Failed to load report {}: {}", id, e);
            service_error(e)
        }
    }
}

/// GET /reports/date/{date} - Reports created on a YYYY-MM-DD day
async fn get_reports_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> impl IntoResponse {
    let Ok(date) = NaiveDate::parse_from_str(&date, "%Y-%m-%d") else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "잘못된 날짜 형식입니다. YYYY-MM-DD 형식을 사용해주세요.",
        );
    };

    match state.report_service.by_date(date) {
        Ok(reports) => (StatusCode::OK, Json(reports)).into_response(),
        Err(e) => {
            error!("Failed to load reports for {}: {}", date, e);
            service_error(e)
        }
    }
}

/// POST /reports/generate/{type} - Run the report pipeline now
async fn generate_report(
    State(state): State<AppState>,
    Path(report_type): Path<String>,
) -> impl IntoResponse {
    let report_type = match report_type.parse::<ReportType>() {
        Ok(rt) => rt,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    match state.scheduler.generate_manual(report_type).await {
        Ok(manual) => (StatusCode::OK, Json(manual)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// POST /reports/test/generate/{type} - Generation with timing; failures
/// are reported in the body
async fn test_generate_report(
    State(state): State<AppState>,
    Path(report_type): Path<String>,
) -> impl IntoResponse {
    match report_type.parse::<ReportType>() {
        Ok(rt) => Json(state.testing_service.timed_generate(rt).await),
        Err(e) => {
            let now = Utc::now();
            Json(TimedGeneration {
                success: false,
                report: None,
                error: Some(e),
                metrics: RunMetrics {
                    duration: 0,
                    news_processed: Some(0),
                    start_time: now,
                    end_time: now,
                },
            })
        }
    }
}

/// POST /reports/test/news/collect
async fn test_collect_news(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.testing_service.timed_collect().await)
}

/// GET /reports/test/flow/status - News, report and scheduler state at once
async fn test_flow_status(State(state): State<AppState>) -> impl IntoResponse {
    let news = match state.news_service.stats() {
        Ok(stats) => stats,
        Err(e) => return service_error(e.into()),
    };
    let reports = match state.report_service.stats() {
        Ok(stats) => stats,
        Err(e) => return service_error(e),
    };

    let status = FlowStatus {
        news,
        reports,
        scheduler: state.scheduler.status(),
        system: SystemInfo {
            current_time: Utc::now(),
            timezone: state.report_service.timezone().name().to_string(),
            environment: if cfg!(debug_assertions) {
                "development"
            } else {
                "production"
            },
        },
    };
    (StatusCode::OK, Json(status)).into_response()
}

/// POST /reports/test/flow/full - Collect, then morning and evening reports
async fn test_full_flow(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.testing_service.full_flow().await)
}
