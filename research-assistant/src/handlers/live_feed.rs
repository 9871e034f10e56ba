use crate::handlers::htmx::{HxRequest, UiError};
use crate::handlers::views::WorkspaceView;
use crate::models::{LiveFeedForm, ResearchWorkspace};
use crate::AppState;
use askama::Template;
use axum::{extract::State, response::Response, Form};
use chrono::Utc;
use tower_sessions::Session;
use validator::Validate;

#[derive(Template)]
#[template(path = "fragments/live_feed.html")]
pub struct LiveFeedFragment {
    pub view: WorkspaceView,
}

pub async fn ingest_live_update(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
    Form(form): Form<LiveFeedForm>,
) -> Result<Response, UiError> {
    let form = form.normalized();
    form.validate().map_err(|e| hx.error(e))?;

    let mut workspace = ResearchWorkspace::load(&session, &state.settings.credits)
        .await
        .map_err(|e| hx.error(e))?;

    let entry = workspace.ingest_live_update(form, Utc::now());
    tracing::info!(
        id = %entry.id,
        source = %entry.source,
        content_len = entry.content.len(),
        "Live update ingested"
    );

    workspace.save(&session).await.map_err(|e| hx.error(e))?;

    hx.fragment_or_redirect(LiveFeedFragment {
        view: WorkspaceView::from(&workspace),
    })
}
