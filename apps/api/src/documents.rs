//! Text Provider — turns an uploaded document into plain UTF-8 text.
//!
//! PDF decoding is CPU-bound and runs inside `tokio::task::spawn_blocking`.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Extensions accepted at the upload boundary.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt"];

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Could not read document: {0}")]
    Parse(String),
}

#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lower-cased extension, if the name has one.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }

    pub fn is_allowed(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// Opaque supplier of document text. Carried in `AppState` as `Arc<dyn TextExtractor>`.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, document: &UploadedDocument) -> Result<String, DocumentError>;
}

pub struct DocumentTextExtractor;

#[async_trait]
impl TextExtractor for DocumentTextExtractor {
    async fn extract_text(&self, document: &UploadedDocument) -> Result<String, DocumentError> {
        match document.extension().as_deref() {
            Some("txt") => Ok(String::from_utf8_lossy(&document.bytes).into_owned()),
            Some("pdf") => {
                let bytes = document.bytes.clone();
                tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                    .await
                    .map_err(|e| DocumentError::Parse(format!("PDF decoder aborted: {e}")))?
                    .map_err(|e| DocumentError::Parse(e.to_string()))
            }
            _ => Err(DocumentError::UnsupportedFormat(document.file_name.clone())),
        }
    }
}
