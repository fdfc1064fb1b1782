//! Investment Helper API Server
//!
//! Collects financial news, writes scheduled investment reports with an LLM
//! and serves both over HTTP.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use invest_llm::AnalysisClient;
use invest_news::{FeedFetcher, RssClient};
use invest_services::{
    AppConfig, CollectorConfig, NewsService, ReportScheduler, ReportService, SchedulerConfig,
    Storage, TestingService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub llm: Arc<AnalysisClient>,
    pub news_service: Arc<NewsService>,
    pub report_service: Arc<ReportService>,
    pub scheduler: Arc<ReportScheduler>,
    pub testing_service: Arc<TestingService>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the service graph over one storage handle
    pub fn new(
        storage: Arc<Storage>,
        fetcher: Arc<dyn FeedFetcher>,
        llm: AnalysisClient,
        scheduler_config: SchedulerConfig,
    ) -> Self {
        let llm = Arc::new(llm);
        let news_service = Arc::new(NewsService::new(
            storage.clone(),
            fetcher,
            CollectorConfig::default(),
        ));
        let report_service = Arc::new(ReportService::new(
            storage.clone(),
            news_service.clone(),
            llm.clone(),
            scheduler_config.timezone,
        ));
        let testing_service = Arc::new(TestingService::new(
            storage.clone(),
            news_service.clone(),
            report_service.clone(),
            llm.clone(),
        ));
        let scheduler = Arc::new(ReportScheduler::new(
            report_service.clone(),
            news_service.clone(),
            scheduler_config,
        ));

        Self {
            storage,
            llm,
            news_service,
            report_service,
            scheduler,
            testing_service,
            started_at: Instant::now(),
        }
    }
}

/// Build the HTTP application with CORS and request tracing
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env.local takes precedence over .env
    for file in [".env.local", ".env"] {
        if let Err(e) = dotenvy::from_filename(file) {
            if !matches!(e, dotenvy::Error::Io(_)) {
                eprintln!("Warning: Failed to load {}: {}", file, e);
            }
        }
    }

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,invest_api=debug,invest_services=debug")),
        )
        .init();

    info!("Starting Investment Helper API");

    let config = AppConfig::from_env()?;

    info!("Initializing storage at: {}", config.database_path.display());
    let storage = Arc::new(Storage::new(&config.database_path)?);

    let llm = AnalysisClient::from_configs(config.gemini.clone(), config.openai.clone())
        .with_timezone(config.scheduler.timezone);
    if llm.is_configured() {
        info!("LLM providers configured: {}", llm.provider_names().join(", "));
    } else {
        warn!("No LLM provider configured (set GEMINI_API_KEY or OPENAI_API_KEY) - reports will carry the fallback notice");
    }

    let state = AppState::new(
        storage,
        Arc::new(RssClient::new()),
        llm,
        config.scheduler.clone(),
    );

    if let Err(e) = state.scheduler.start().await {
        error!("Failed to start report scheduler: {}", e);
    }

    let scheduler = state.scheduler.clone();
    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
