use crate::handlers::htmx::{HxRequest, UiError};
use crate::models::ResearchWorkspace;
use crate::services::export::{export_report, ExportFormat};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use tower_sessions::Session;

/// Download the session's last report as DOCX or PDF.
pub async fn export(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
    Path(format): Path<String>,
) -> Result<Response, UiError> {
    let format: ExportFormat = format.parse().map_err(|e| hx.error(e))?;

    let workspace = ResearchWorkspace::load(&session, &state.settings.credits)
        .await
        .map_err(|e| hx.error(e))?;

    let report = workspace.last_report.ok_or_else(|| {
        hx.error(AppError::NotFound(anyhow::anyhow!(
            "No report has been generated yet. Ask a research question first."
        )))
    })?;

    let bytes = tokio::task::spawn_blocking(move || export_report(&report, format))
        .await
        .map_err(|e| hx.error(AppError::InternalError(e.into())))?
        .map_err(|e| hx.error(e))?;

    tracing::info!(
        format = format.as_str(),
        size = bytes.len(),
        "Report exported"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        bytes,
    )
        .into_response())
}
