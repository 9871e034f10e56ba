//! Live feed updates: user-supplied snippets used as extra research input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Source label used when the user leaves the source blank.
pub const DEFAULT_SOURCE: &str = "MockSource";

/// Characters shown in the sidebar before the content is cut.
pub const PREVIEW_CHARS: usize = 200;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Form submitted by the "Ingest live update" panel.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LiveFeedForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide a title for the live update."))]
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide content for the live update."))]
    pub content: String,
}

impl LiveFeedForm {
    /// Trim every field; validation runs on the trimmed values.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            source: self.source.trim().to_string(),
            content: self.content.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveFeedEntry {
    pub id: String,
    pub title: String,
    pub source: String,
    pub content: String,
    pub ingested_at: DateTime<Utc>,
}

impl LiveFeedEntry {
    pub fn new(title: String, source: String, content: String, now: DateTime<Utc>) -> Self {
        let source = if source.is_empty() {
            DEFAULT_SOURCE.to_string()
        } else {
            source
        };

        Self {
            id: now.timestamp_millis().to_string(),
            title,
            source,
            content,
            ingested_at: now,
        }
    }

    pub fn timestamp(&self) -> String {
        self.ingested_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn preview(&self) -> String {
        preview(&self.content)
    }

    /// Citation description, e.g. `blog.example.com: Title (2025-09-20 10:00:00)`.
    pub fn citation(&self) -> String {
        format!("{}: {} ({})", self.source, self.title, self.timestamp())
    }
}

/// First [`PREVIEW_CHARS`] characters, with an ellipsis when truncated.
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Prompt text for the whole feed, in display order.
pub fn combined_text(feed: &[LiveFeedEntry]) -> String {
    feed.iter()
        .map(|e| format!("{} ({}):\n{}", e.title, e.source, e.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
