use serde::{Deserialize, Serialize};

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TXT_MIME: &str = "text/plain";

/// Upload formats the assistant can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    /// Detect the kind from the file extension first, then the declared MIME type.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            return Some(DocumentKind::Pdf);
        }
        if lower.ends_with(".docx") {
            return Some(DocumentKind::Docx);
        }
        if lower.ends_with(".txt") {
            return Some(DocumentKind::Txt);
        }

        // Ignore parameters such as "; charset=utf-8".
        let mime = content_type?
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            PDF_MIME => Some(DocumentKind::Pdf),
            DOCX_MIME => Some(DocumentKind::Docx),
            TXT_MIME => Some(DocumentKind::Txt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Txt => "txt",
        }
    }
}

/// Plain text pulled out of one uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub name: String,
    pub kind: DocumentKind,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension_case_insensitively() {
        assert_eq!(DocumentKind::detect("Paper.PDF", None), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::detect("notes.docx", None), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::detect("readme.TxT", None), Some(DocumentKind::Txt));
    }

    #[test]
    fn falls_back_to_mime_type() {
        assert_eq!(
            DocumentKind::detect("upload", Some("text/plain; charset=utf-8")),
            Some(DocumentKind::Txt)
        );
        assert_eq!(
            DocumentKind::detect("blob", Some(DOCX_MIME)),
            Some(DocumentKind::Docx)
        );
    }

    #[test]
    fn rejects_unknown_formats() {
        assert_eq!(DocumentKind::detect("slides.pptx", None), None);
        assert_eq!(DocumentKind::detect("image.png", Some("image/png")), None);
    }
}
