//! Plain-text extraction for uploaded PDF, DOCX and TXT files.
//!
//! PDF goes through `pdf-extract`; DOCX is read directly from the OOXML
//! package (`word/document.xml`) with `zip` + `quick-xml`; TXT is decoded as
//! lossy UTF-8. Parsing is CPU-bound, so [`extract_document`] moves it onto
//! the blocking pool.

use crate::models::{DocumentKind, ExtractedDocument};
use quick_xml::events::Event;
use quick_xml::Reader;
use service_core::error::AppError;
use std::io::{Cursor, Read};
use thiserror::Error;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type for '{name}'. Upload PDF, DOCX or TXT files.")]
    Unsupported { name: String },

    #[error("Could not read '{name}': {reason}")]
    Failed { name: String, reason: String },

    #[error("No text could be extracted from '{name}'")]
    Empty { name: String },
}

impl ExtractionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::Unsupported { .. } => "unsupported",
            ExtractionError::Failed { .. } => "failed",
            ExtractionError::Empty { .. } => "empty",
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Unsupported { .. } => AppError::UnsupportedMediaType(err.to_string()),
            ExtractionError::Failed { .. } | ExtractionError::Empty { .. } => {
                AppError::Unprocessable(err.to_string())
            }
        }
    }
}

/// Detect the format and extract text without blocking the async runtime.
pub async fn extract_document(
    name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
) -> Result<ExtractedDocument, ExtractionError> {
    let join_name = name.clone();
    tokio::task::spawn_blocking(move || extract_text(&name, content_type.as_deref(), &bytes))
        .await
        .map_err(|e| ExtractionError::Failed {
            name: join_name,
            reason: format!("extraction task failed: {}", e),
        })?
}

/// Synchronous extraction entry point.
pub fn extract_text(
    name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<ExtractedDocument, ExtractionError> {
    let kind = DocumentKind::detect(name, content_type).ok_or_else(|| {
        ExtractionError::Unsupported {
            name: name.to_string(),
        }
    })?;

    let failed = |reason: String| ExtractionError::Failed {
        name: name.to_string(),
        reason,
    };

    let text = match kind {
        DocumentKind::Pdf => extract_pdf(bytes).map_err(failed)?,
        DocumentKind::Docx => extract_docx(bytes).map_err(failed)?,
        DocumentKind::Txt => String::from_utf8_lossy(bytes).into_owned(),
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty {
            name: name.to_string(),
        });
    }

    tracing::debug!(
        file_name = %name,
        kind = kind.as_str(),
        chars = text.len(),
        "Extracted document text"
    );

    Ok(ExtractedDocument {
        name: name.to_string(),
        kind,
        text,
    })
}

fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    // pdf-extract panics on some malformed inputs.
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(format!("invalid PDF: {:?}", e)),
        Err(_) => Err("PDF parser crashed on this file".to_string()),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("not a DOCX package: {}", e))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| format!("missing word/document.xml: {}", e))?
        .read_to_string(&mut xml)
        .map_err(|e| format!("unreadable word/document.xml: {}", e))?;

    paragraphs_from_document_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

/// Collect the text of each non-empty `w:p` paragraph.
fn paragraphs_from_document_xml(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    // xml:space="preserve" runs carry meaningful whitespace.
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:p" => current.clear(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.unescape().map_err(|e| format!("bad XML text: {}", e))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if !current.trim().is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("malformed document.xml: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

/// Prompt text for all documents: `[File: name]` headers, blank-line separated.
pub fn combine(documents: &[ExtractedDocument]) -> String {
    documents
        .iter()
        .map(|d| format!("[File: {}]\n{}\n", d.name, d.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
