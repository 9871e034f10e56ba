use crate::handlers::htmx::{HxRequest, UiError};
use crate::handlers::views::WorkspaceView;
use crate::models::ResearchWorkspace;
use crate::services::{ResearchRequest, Upload};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Response,
};
use service_core::error::AppError;
use tower_sessions::Session;

/// Report panel plus out-of-band refreshes of the credit header, sources and
/// billing log.
#[derive(Template)]
#[template(path = "fragments/research.html")]
pub struct ResearchFragment {
    pub view: WorkspaceView,
}

pub async fn generate_report(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
    multipart: Multipart,
) -> Result<Response, UiError> {
    let mut workspace = ResearchWorkspace::load(&session, &state.settings.credits)
        .await
        .map_err(|e| hx.error(e))?;

    let request = read_research_form(multipart, state.settings.http.max_upload_bytes)
        .await
        .map_err(|e| hx.error(e))?;

    state
        .research
        .generate(&mut workspace, request)
        .await
        .map_err(|e| hx.error(e))?;

    workspace.save(&session).await.map_err(|e| hx.error(e))?;

    hx.fragment_or_redirect(ResearchFragment {
        view: WorkspaceView::from(&workspace),
    })
}

/// Collect the `question` field and every non-empty `files` part.
async fn read_research_form(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<ResearchRequest, AppError> {
    let mut request = ResearchRequest::default();
    let upload_error = |e: MultipartError| multipart_error(e, max_upload_bytes);

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("question") => {
                request.question = field.text().await.map_err(upload_error)?;
            }
            Some("files") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(upload_error)?;

                // Browsers send an empty part when no file was picked.
                if name.is_empty() && bytes.is_empty() {
                    continue;
                }

                tracing::debug!(file_name = %name, size = bytes.len(), "Received upload");
                request.uploads.push(Upload {
                    name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(request)
}

fn multipart_error(e: MultipartError, max_upload_bytes: usize) -> AppError {
    let status = e.status();
    tracing::warn!(error = %e, status = %status, "Malformed upload");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(format!(
            "The upload is too large. Files and question together are limited to {} per request.",
            human_size(max_upload_bytes)
        ));
    }
    AppError::BadRequest(anyhow::anyhow!(
        "The upload could not be read ({}).",
        e.body_text()
    ))
}

fn human_size(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}
