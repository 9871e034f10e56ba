//! Report export to DOCX and PDF.

mod docx;
mod pdf;

pub use docx::to_docx;
pub use pdf::{layout, to_pdf, PageLayout};

use crate::models::Report;
use service_core::error::AppError;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unknown export format '{0}'. Use 'docx' or 'pdf'.")]
    UnknownFormat(String),

    #[error("Nothing to export: the report is empty")]
    EmptyReport,

    #[error("Failed to build DOCX: {0}")]
    Docx(String),

    #[error("Failed to build PDF: {0}")]
    Pdf(String),
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnknownFormat(_) => AppError::NotFound(anyhow::anyhow!(err.to_string())),
            ExportError::EmptyReport => AppError::Unprocessable(err.to_string()),
            ExportError::Docx(_) | ExportError::Pdf(_) => AppError::InternalError(err.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Pdf,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Docx => crate::models::document::DOCX_MIME,
            ExportFormat::Pdf => crate::models::document::PDF_MIME,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "research_report.docx",
            ExportFormat::Pdf => "research_report.pdf",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docx" => Ok(ExportFormat::Docx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Render a stored report in the requested format.
pub fn export_report(report: &Report, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    if report.body.trim().is_empty() {
        return Err(ExportError::EmptyReport);
    }

    let title = report.title();
    match format {
        ExportFormat::Docx => to_docx(&report.body, &title),
        ExportFormat::Pdf => to_pdf(&report.body, &title),
    }
}
