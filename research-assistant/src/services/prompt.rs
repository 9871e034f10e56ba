//! Prompt construction for report generation.

use crate::models::live_feed::combined_text;
use crate::models::{ExtractedDocument, LiveFeedEntry, SourceRef};
use crate::services::extraction::combine;
use crate::services::providers::ReportPrompt;

pub const SYSTEM_PROMPT: &str = "You are an expert research assistant. Generate a structured, evidence-based research report \
that contains: Key Takeaways (bulleted), Abstract, Introduction, Main Sections depending on the question, \
Conclusion, and References. Inline-cite sources using [1], [2] etc. At the end include a 'Sources' section \
that maps citation numbers to source names/URLs/pages.\n\n\
If provided with uploaded file content or live feed content, use that content as primary evidence. \
If content isn't provided, produce a concise general report.";

const NONE_MARKER: &str = "[none]";

fn or_none(text: &str) -> &str {
    if text.trim().is_empty() {
        NONE_MARKER
    } else {
        text
    }
}

pub fn user_prompt(question: &str, file_text: &str, live_text: &str) -> String {
    format!(
        "Question: {question}\n\n\
         Uploaded file content (if any):\n{files}\n\n\
         Live feed content (if any):\n{live}\n\n\
         Instructions:\n\
         - Compose a report ~ 400-800 words depending on complexity.\n\
         - Use inline citation markers like [1], [2] where you reference the provided content.\n\
         - At the end, include a \"Sources:\" section listing sources in the format:\n  \
         [1] source description (e.g., 'myfile.pdf p.12' or 'MockNews: article title (2025-09-20)')\n",
        files = or_none(file_text),
        live = or_none(live_text),
    )
}

/// Assemble system and user messages from the question and collected inputs.
pub fn build_prompt(
    question: &str,
    documents: &[ExtractedDocument],
    live_feed: &[LiveFeedEntry],
) -> ReportPrompt {
    let file_text = combine(documents);
    let live_text = combined_text(live_feed);

    ReportPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user: user_prompt(question, &file_text, &live_text),
        question: question.to_string(),
        file_text,
        live_text,
    }
}

/// Citation candidates: uploaded files first, then live feed entries, numbered from 1.
pub fn combined_sources(
    documents: &[ExtractedDocument],
    live_feed: &[LiveFeedEntry],
) -> Vec<SourceRef> {
    let files = documents
        .iter()
        .map(|doc| format!("{} (uploaded file)", doc.name));
    let live = live_feed.iter().map(LiveFeedEntry::citation);

    files
        .chain(live)
        .enumerate()
        .map(|(i, description)| SourceRef {
            id: i + 1,
            description,
        })
        .collect()
}
