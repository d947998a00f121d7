//! services/api/src/adapters/pdf.rs
//!
//! Implements the `DocumentTextExtractor` port. PDFs go through `pdf-extract`;
//! anything else must already be UTF-8 text.

use async_trait::async_trait;
use lucidcare_core::ports::{DocumentTextExtractor, PortError, PortResult};
use tracing::warn;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Clone, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

pub fn is_pdf(data: &[u8]) -> bool {
    // Some producers put a few junk bytes before the header.
    data.windows(PDF_MAGIC.len())
        .take(1024)
        .any(|w| w == PDF_MAGIC)
}

#[async_trait]
impl DocumentTextExtractor for PdfTextExtractor {
    async fn extract_text(&self, file_name: &str, data: &[u8]) -> PortResult<String> {
        if !is_pdf(data) {
            return String::from_utf8(data.to_vec()).map_err(|_| {
                PortError::InvalidDocument(format!(
                    "'{}' is neither a PDF nor a plain-text file",
                    file_name
                ))
            });
        }

        // Parsing is CPU-bound and can panic on broken files.
        let bytes = data.to_vec();
        let outcome = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                warn!("PDF extraction task for '{}' failed: {}", file_name, e);
                PortError::InvalidDocument(format!("'{}' could not be read as a PDF", file_name))
            })?;

        let text = outcome.map_err(|e| {
            warn!("PDF extraction for '{}' failed: {}", file_name, e);
            PortError::InvalidDocument(format!("'{}' could not be read as a PDF", file_name))
        })?;

        Ok(text)
    }
}
