//! Plain-text extraction for uploaded résumés.
//!
//! Only two declared types are accepted: PDF and Office Open XML word-processing
//! documents. Anything else is rejected at the upload boundary before reaching
//! an extractor.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

mod docx;
mod pdf;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Map a declared content type (parameters ignored) to a supported kind.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF_MIME => Some(DocumentKind::Pdf),
            DOCX_MIME => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid pdf: {0}")]
    Pdf(String),

    #[error("invalid docx: {0}")]
    Docx(String),

    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Converts an uploaded document into plain text.
///
/// Blank output is not an error here; callers decide what an empty document means.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, bytes: Bytes, kind: DocumentKind) -> Result<String, ExtractError>;
}

/// Default extractor backed by `pdf-extract` and a `zip`/`quick-xml` DOCX reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

#[async_trait]
impl DocumentExtractor for TextExtractor {
    async fn extract(&self, bytes: Bytes, kind: DocumentKind) -> Result<String, ExtractError> {
        let len = bytes.len();
        // pdf-extract may panic on hostile input; a panic surfaces as a JoinError here.
        let text = tokio::task::spawn_blocking(move || match kind {
            DocumentKind::Pdf => pdf::extract_text(&bytes),
            DocumentKind::Docx => docx::extract_text(&bytes),
        })
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))??;

        debug!(?kind, bytes = len, chars = text.chars().count(), "document extracted");
        Ok(text)
    }
}
