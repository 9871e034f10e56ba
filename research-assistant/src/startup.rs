use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware,
    tracing::{http_request_span, request_id_middleware},
};
use std::future::Future;
use std::path::PathBuf;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Settings;
use crate::handlers::{
    app::{health_check, index, readiness_check},
    export::export,
    live_feed::ingest_live_update,
    metrics::metrics,
    research::generate_report,
    workspace::workspace_snapshot,
};
use crate::middleware::metrics::metrics_middleware;
use crate::services::{providers, ResearchService};
use crate::AppState;

/// Session inactivity before the workspace (and its credits) is dropped.
const SESSION_IDLE_HOURS: i64 = 24;

fn static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

pub fn build_router(state: AppState) -> Router {
    // Session setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.settings.http.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_IDLE_HOURS)));

    let max_upload_bytes = state.settings.http.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/research", post(generate_report))
        .route("/live-feed", post(ingest_live_update))
        .route("/report/export/:format", get(export))
        .route("/api/workspace", get(workspace_snapshot))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route_layer(from_fn(metrics_middleware))
        .nest_service("/static", ServeDir::new(static_dir()))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(http_request_span::<axum::body::Body>))
        // Outermost so the span sees the request id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Bound listener plus router, ready to serve.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let provider = providers::from_settings(&settings.llm).map_err(|e| {
            tracing::error!("Failed to initialize report provider: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e))
        })?;
        let research = ResearchService::new(provider, &settings.llm);

        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let router = build_router(AppState::new(settings, research));

        tracing::info!("research-assistant listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }

    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await
    }
}
