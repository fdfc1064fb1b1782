//! News-related API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::error;

use super::service_error;
use crate::AppState;

const DEFAULT_RECENT_HOURS: u32 = 24;

/// Query parameters for recent news
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    /// Look-back window in hours (default 24)
    pub hours: Option<String>,
}

/// Create news routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/news/stats", get(get_news_stats))
        .route("/news/recent", get(get_recent_news))
        .route("/news/category/{category}", get(get_news_by_category))
        .route("/news/unprocessed", get(get_unprocessed_news))
}

/// GET /news/stats
async fn get_news_stats(State(state): State<AppState>) -> impl IntoResponse {
    match state.news_service.stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => {
            error!("Failed to compute news stats: {}", e);
            service_error(e.into())
        }
    }
}

/// GET /news/recent?hours=N
async fn get_recent_news(
    State(state): State<AppState>,
    Query(params): Query<RecentQuery>,
) -> impl IntoResponse {
    let hours = params
        .hours
        .as_deref()
        .and_then(|h| h.trim().parse::<u32>().ok())
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_RECENT_HOURS);

    match state.news_service.recent(hours) {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => {
            error!("Failed to load recent news: {}", e);
            service_error(e.into())
        }
    }
}

/// GET /news/category/{category}
async fn get_news_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> impl IntoResponse {
    match state.news_service.by_category(&category) {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => {
            error!("Failed to load {} news: {}", category, e);
            service_error(e.into())
        }
    }
}

/// GET /news/unprocessed - The batch the next report would consume
async fn get_unprocessed_news(State(state): State<AppState>) -> impl IntoResponse {
    match state.news_service.unprocessed() {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => {
            error!("Failed to load unprocessed news: {}", e);
            service_error(e.into())
        }
    }
}
