use crate::handlers::htmx::{HxRequest, UiError};
use crate::handlers::views::WorkspaceView;
use crate::models::ResearchWorkspace;
use crate::AppState;
use askama::Template;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tower_sessions::Session;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: WorkspaceView,
    pub provider_mode: &'static str,
    pub max_upload_mb: usize,
}

pub async fn index(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
) -> Result<IndexTemplate, UiError> {
    let workspace = ResearchWorkspace::load(&session, &state.settings.credits)
        .await
        .map_err(|e| hx.error(e))?;

    Ok(IndexTemplate {
        view: WorkspaceView::from(&workspace),
        provider_mode: state.research.provider_mode(),
        max_upload_mb: state.settings.http.max_upload_bytes / (1024 * 1024),
    })
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let provider = state.research.provider();
    Json(json!({
        "status": "ok",
        "service": "research-assistant",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.research.provider_mode(),
        "model": provider.model(),
    }))
}

/// Readiness: the report provider must answer its own health check.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let provider = state.research.provider();
    match provider.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "provider": state.research.provider_mode(),
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, kind = e.kind(), "Report provider is not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "provider": state.research.provider_mode(),
                    "error": e.to_string(),
                })),
            )
        }
    }
}
