//! Template-ready projections of the session workspace.

use crate::models::{BillingRecord, LiveFeedEntry, Report, ResearchWorkspace};
use crate::services::report::render_html;

pub struct LiveFeedItem {
    pub title: String,
    pub source: String,
    pub timestamp: String,
    pub preview: String,
}

impl From<&LiveFeedEntry> for LiveFeedItem {
    fn from(entry: &LiveFeedEntry) -> Self {
        Self {
            title: entry.title.clone(),
            source: entry.source.clone(),
            timestamp: entry.timestamp(),
            preview: entry.preview(),
        }
    }
}

pub struct BillingItem {
    pub timestamp: String,
    pub question: String,
    pub cost: String,
}

impl From<&BillingRecord> for BillingItem {
    fn from(record: &BillingRecord) -> Self {
        Self {
            timestamp: record.timestamp(),
            question: record.question.clone(),
            cost: format_credits(record.cost),
        }
    }
}

pub struct ReportView {
    pub question: String,
    pub generated_at: String,
    pub model: String,
    pub mocked: bool,
    pub key_takeaways: Vec<String>,
    pub sources: Vec<String>,
    /// Rendered markdown; raw HTML from the model is already escaped.
    pub html: String,
}

impl From<&Report> for ReportView {
    fn from(report: &Report) -> Self {
        Self {
            question: report.question.clone(),
            generated_at: report.timestamp(),
            model: report.model.clone(),
            mocked: report.mocked,
            key_takeaways: report.key_takeaways.clone(),
            sources: report.sources.clone(),
            html: render_html(&report.body),
        }
    }
}

pub struct WorkspaceView {
    pub credits_used: String,
    pub credits_remaining: String,
    pub out_of_credits: bool,
    pub questions: u32,
    pub reports: u32,
    pub sources: Vec<String>,
    pub live_feed: Vec<LiveFeedItem>,
    pub billing: Vec<BillingItem>,
    pub report: Option<ReportView>,
}

impl From<&ResearchWorkspace> for WorkspaceView {
    fn from(ws: &ResearchWorkspace) -> Self {
        Self {
            credits_used: format_credits(ws.credits.used),
            credits_remaining: format_credits(ws.credits.remaining),
            out_of_credits: ws.credits.ensure_available().is_err(),
            questions: ws.questions,
            reports: ws.reports,
            sources: ws.sources.clone(),
            live_feed: ws.live_feed.iter().map(LiveFeedItem::from).collect(),
            billing: ws
                .credits
                .recent_billing()
                .iter()
                .map(BillingItem::from)
                .collect(),
            report: ws.last_report.as_ref().map(ReportView::from),
        }
    }
}

fn format_credits(value: f64) -> String {
    format!("{:.2}", value)
}
