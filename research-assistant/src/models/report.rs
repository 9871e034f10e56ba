use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::live_feed::TIMESTAMP_FORMAT;

/// A source the model may cite, numbered in prompt order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    pub id: usize,
    pub description: String,
}

impl SourceRef {
    pub fn label(&self) -> String {
        format!("[{}] {}", self.id, self.description)
    }
}

/// A generated research report, kept in the session for download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub question: String,
    /// Markdown text as returned by the provider.
    pub body: String,
    pub key_takeaways: Vec<String>,
    pub sources: Vec<String>,
    pub model: String,
    /// True when the text came from the built-in mock provider.
    pub mocked: bool,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Title used in exported documents.
    pub fn title(&self) -> String {
        format!("Report - {}", self.question)
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}
