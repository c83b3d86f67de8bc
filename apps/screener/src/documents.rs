//! Best-effort text from uploaded job descriptions and resumes.
//!
//! Extraction never fails loudly: any error yields an empty string, and the
//! workflow's non-empty check on start rejects it.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Declared type of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    /// Resolves the kind from an upload's content type, then its file name.
    /// Returns `None` for anything that is neither text nor PDF.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());
        match mime.as_deref() {
            Some("application/pdf") => return Some(Self::Pdf),
            Some("text/plain") => return Some(Self::PlainText),
            _ => {}
        }

        let ext = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => Some(Self::Pdf),
            Some("txt") => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Returns the document's text, or an empty string if it cannot be read.
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> String {
    match kind {
        DocumentKind::PlainText => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(e) => {
                warn!("Plain-text document is not valid UTF-8: {e}");
                String::new()
            }
        },
        DocumentKind::Pdf => extract_pdf_text(bytes),
    }
}

fn extract_pdf_text(bytes: &[u8]) -> String {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("PDF text extraction failed: {e}");
            String::new()
        }
        Err(_) => {
            warn!("PDF text extraction panicked");
            String::new()
        }
    }
}
