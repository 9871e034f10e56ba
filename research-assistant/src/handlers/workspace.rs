use crate::models::ResearchWorkspace;
use crate::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use tower_sessions::Session;

/// JSON snapshot of the session workspace.
pub async fn workspace_snapshot(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ResearchWorkspace>, AppError> {
    let workspace = ResearchWorkspace::load(&session, &state.settings.credits).await?;
    Ok(Json(workspace))
}
