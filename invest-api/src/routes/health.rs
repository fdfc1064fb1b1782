//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    database: bool,
    llm_providers: Vec<String>,
    uptime: f64,
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.storage.ping() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Database health check failed: {}", e);
            false
        }
    };

    let status = if database && state.llm.is_configured() {
        "healthy"
    } else {
        "degraded"
    };

    let response = HealthResponse {
        status,
        database,
        llm_providers: state.llm.provider_names(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    };

    // An unconfigured LLM still produces fallback reports
    let code = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::{get, json_body, test_app};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_without_providers_is_degraded() {
        let (app, _) = test_app();

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"], true);
        assert_eq!(body["llmProviders"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_liveness() {
        let (app, _) = test_app();
        let response = app.oneshot(get("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
