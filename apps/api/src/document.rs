//! Uploaded document → plain text.

use std::sync::Arc;

use thiserror::Error;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum DocumentParseError {
    #[error("upload is not a PDF document")]
    NotPdf,

    #[error("failed to read PDF: {0}")]
    Malformed(String),
}

/// Turns raw upload bytes into text. Implementations are synchronous and may
/// be CPU heavy; callers run them off the async runtime.
pub trait DocumentReader: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, DocumentParseError>;
}

/// PDF text extraction via `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReader;

impl DocumentReader for PdfReader {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, DocumentParseError> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(DocumentParseError::NotPdf);
        }
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| DocumentParseError::Malformed(format!("{e:?}")))
    }
}

/// Runs `reader` on a blocking thread. A panic inside the reader is reported
/// as a malformed document rather than tearing down the request task.
pub async fn read_document(
    reader: Arc<dyn DocumentReader>,
    bytes: bytes::Bytes,
) -> Result<String, DocumentParseError> {
    tokio::task::spawn_blocking(move || reader.extract_text(&bytes))
        .await
        .map_err(|e| DocumentParseError::Malformed(format!("reader aborted: {e}")))?
}
