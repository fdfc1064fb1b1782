//! API route definitions

mod health;
mod news;
mod reports;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use invest_core::InvestError;

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(reports::routes())
        .merge(news::routes())
        .merge(test::routes())
        .merge(health::routes())
}

/// `{"error": message}` with the given status
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": message.into()
        })),
    )
        .into_response()
}

/// Map a service error onto its HTTP status
pub(crate) fn service_error(err: InvestError) -> Response {
    let status = match &err {
        InvestError::NotFound(_) => StatusCode::NOT_FOUND,
        InvestError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, Router};
    use invest_llm::AnalysisClient;
    use invest_news::RssClient;
    use invest_services::{SchedulerConfig, Storage};

    use crate::{app, AppState};

    pub(crate) fn test_app() -> (Router, AppState) {
        let storage = Arc::new(Storage::new_in_memory().unwrap());
        let state = AppState::new(
            storage,
            Arc::new(RssClient::new()),
            AnalysisClient::unconfigured(),
            SchedulerConfig::default(),
        );
        (app(state.clone()), state)
    }

    pub(crate) fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub(crate) fn send(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub(crate) async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_service_error_status_mapping() {
        use axum::http::StatusCode;
        use invest_core::InvestError;

        let status = |e: InvestError| super::service_error(e).status();
        assert_eq!(status(InvestError::not_found("report 7")), StatusCode::NOT_FOUND);
        assert_eq!(status(InvestError::invalid_input("bad date")), StatusCode::BAD_REQUEST);
        assert_eq!(status(InvestError::database("locked")), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(InvestError::network("timeout")), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
