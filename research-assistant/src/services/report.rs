//! Post-processing of the provider's report text.

use crate::models::SourceRef;
use pulldown_cmark::{html, Event, Options, Parser};

/// Lines scanned after the "Key Takeaways" heading.
const TAKEAWAY_SCAN_LINES: usize = 7;

const LIST_MARKERS: &[char] = &['-', '•', '*'];

/// Heading text without `#`/`**` decoration, a trailing colon or case.
fn heading_text(line: &str) -> String {
    line.trim()
        .trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim()
        .trim_end_matches(':')
        .trim_end()
        .to_lowercase()
}

fn is_sources_heading(line: &str) -> bool {
    let text = heading_text(line);
    text == "sources" || text.starts_with("sources:")
}

fn is_takeaways_heading(line: &str) -> bool {
    heading_text(line) == "key takeaways"
}

/// `---`, `***` and friends.
fn is_horizontal_rule(line: &str) -> bool {
    let marks: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
    marks.len() >= 3
        && matches!(marks[0], '-' | '*' | '_')
        && marks.iter().all(|&c| c == marks[0])
}

/// A list item line. Bold text (`**...`) is not a `*` bullet.
fn is_list_item(line: &str) -> bool {
    line.starts_with(LIST_MARKERS) && !line.starts_with("**") && !is_horizontal_rule(line)
}

/// Drop one leading list marker and the space after it.
fn strip_list_marker(line: &str) -> &str {
    line.strip_prefix(LIST_MARKERS)
        .map(str::trim_start)
        .unwrap_or(line)
        .trim_end()
}

/// Source lines listed under the last `Sources` heading.
///
/// Lines starting with `[` or a list marker are kept, the marker stripped.
pub fn extract_sources(report_text: &str) -> Vec<String> {
    let lines: Vec<&str> = report_text.lines().collect();
    let Some(start) = lines.iter().rposition(|l| is_sources_heading(l)) else {
        return Vec::new();
    };

    lines[start + 1..]
        .iter()
        .map(|l| l.trim())
        .filter(|l| l.starts_with('[') || is_list_item(l))
        .map(|l| strip_list_marker(l).to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Sources from the report, or the numbered prompt sources when the model
/// listed none.
pub fn resolve_sources(report_text: &str, combined: &[SourceRef]) -> Vec<String> {
    let extracted = extract_sources(report_text);
    if extracted.is_empty() {
        combined.iter().map(SourceRef::label).collect()
    } else {
        extracted
    }
}

/// Bullets directly following the "Key Takeaways" heading.
pub fn extract_key_takeaways(report_text: &str) -> Vec<String> {
    let lines: Vec<&str> = report_text.lines().collect();
    let Some(start) = lines.iter().position(|l| is_takeaways_heading(l)) else {
        return Vec::new();
    };

    lines[start + 1..]
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .take(TAKEAWAY_SCAN_LINES)
        .take_while(|l| !l.starts_with('#'))
        .filter(|l| is_list_item(l))
        .map(|l| strip_list_marker(l).to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Markdown to HTML. Raw HTML from the model is shown as text, not markup.
pub fn render_html(report_text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(report_text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(report_text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
