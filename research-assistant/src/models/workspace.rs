//! Session-scoped research workspace.
//!
//! Everything a browser session accumulates (credits, live feed, document
//! sources, billing log, last report) lives in one serializable value stored
//! in the session under [`WORKSPACE_KEY`]. It is not persisted beyond the
//! session store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tower_sessions::Session;

use super::credits::CreditLedger;
use super::live_feed::{LiveFeedEntry, LiveFeedForm};
use super::report::Report;
use crate::config::CreditSettings;

pub const WORKSPACE_KEY: &str = "research_workspace";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchWorkspace {
    pub credits: CreditLedger,
    pub questions: u32,
    pub reports: u32,
    /// Newest first.
    pub live_feed: Vec<LiveFeedEntry>,
    /// Names of the documents behind the most recent report with uploads.
    pub sources: Vec<String>,
    pub last_report: Option<Report>,
}

impl ResearchWorkspace {
    pub fn new(credits: &CreditSettings) -> Self {
        Self {
            credits: CreditLedger::new(credits.initial, credits.cost_per_report),
            questions: 0,
            reports: 0,
            live_feed: Vec::new(),
            sources: Vec::new(),
            last_report: None,
        }
    }

    /// Add a validated live update at the front of the feed.
    pub fn ingest_live_update(&mut self, form: LiveFeedForm, now: DateTime<Utc>) -> &LiveFeedEntry {
        let entry = LiveFeedEntry::new(form.title, form.source, form.content, now);
        self.live_feed.insert(0, entry);
        &self.live_feed[0]
    }

    /// Load the session's workspace, starting a fresh one on first visit.
    pub async fn load(session: &Session, credits: &CreditSettings) -> Result<Self, AppError> {
        let stored: Option<Self> = session.get(WORKSPACE_KEY).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read research workspace from session");
            AppError::InternalError(anyhow::anyhow!("session store error: {}", e))
        })?;

        Ok(stored.unwrap_or_else(|| Self::new(credits)))
    }

    pub async fn save(&self, session: &Session) -> Result<(), AppError> {
        session.insert(WORKSPACE_KEY, self).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to write research workspace to session");
            AppError::InternalError(anyhow::anyhow!("session store error: {}", e))
        })
    }
}
