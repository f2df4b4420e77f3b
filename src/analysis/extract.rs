//! Plain-text extraction from uploaded documents.

use tracing::{debug, warn};

use crate::error::ExtractError;

/// Upload formats we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Dispatch on the filename extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Ok(DocumentKind::Pdf)
        } else if lower.ends_with(".txt") {
            Ok(DocumentKind::PlainText)
        } else {
            Err(ExtractError::UnsupportedFormat {
                filename: filename.to_string(),
            })
        }
    }
}

/// Extract the text of an uploaded document.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    match DocumentKind::from_filename(filename)? {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::PlainText => decode_text(bytes),
    }
}

/// Run `extract_text` on the blocking pool.
///
/// PDF parsing is CPU-bound and the parser may panic on malformed input; a
/// panic is reported as a parse failure.
pub async fn extract_text_blocking(filename: String, bytes: Vec<u8>) -> Result<String, ExtractError> {
    // Fail fast on the extension without touching the pool.
    DocumentKind::from_filename(&filename)?;

    tokio::task::spawn_blocking(move || extract_text(&filename, &bytes))
        .await
        .map_err(|e| {
            warn!(error = %e, "Document extraction task failed");
            ExtractError::Pdf("documento inválido ou corrompido".to_string())
        })?
}

/// Concatenate every page in order and trim.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
        warn!(error = %e, "PDF text extraction failed");
        ExtractError::Pdf(e.to_string())
    })?;

    let text = pages.concat();
    debug!(pages = pages.len(), text_len = text.len(), "PDF text extracted");
    Ok(text.trim().to_string())
}

fn decode_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let text = String::from_utf8(bytes.to_vec())?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
