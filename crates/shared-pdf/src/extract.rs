//! Page-by-page text extraction

use std::panic;

use lopdf::Document;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;

/// Extracts plain text from PDF bytes
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the trimmed text of every page, joined by newlines.
    ///
    /// Pages that fail to decode are skipped. Fails when the bytes are not a
    /// PDF or when no page yields any text.
    pub fn extract(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let doc = Document::load_mem(data).map_err(|e| ExtractionError::Parse(e.to_string()))?;

        let pages = doc.get_pages();
        info!(pages = pages.len(), "Extracting text from PDF");

        let mut text = String::new();
        for &page_num in pages.keys() {
            match doc.extract_text(&[page_num]) {
                Ok(page_text) => {
                    debug!(page = page_num, chars = page_text.chars().count(), "Extracted page");
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Err(e) => {
                    warn!(page = page_num, error = %e, "Failed to extract text from page");
                }
            }
        }

        if text.trim().is_empty() {
            debug!("Page pass yielded no text, trying pdf-extract");
            text = whole_document_text(data).unwrap_or_default();
        }

        let text = text.trim();
        info!(chars = text.chars().count(), "Total extracted text length");

        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }
        Ok(text.to_string())
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract text with a default [`TextExtractor`]
pub fn extract_text(data: &[u8]) -> Result<String, ExtractionError> {
    TextExtractor::new().extract(data)
}

/// pdf-extract panics on some malformed font programs; treat that as no text.
fn whole_document_text(data: &[u8]) -> Option<String> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
        Ok(Ok(text)) => Some(text),
        Ok(Err(e)) => {
            warn!(error = %e, "pdf-extract failed");
            None
        }
        Err(_) => {
            warn!("pdf-extract panicked while reading document");
            None
        }
    }
}
