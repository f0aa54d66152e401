//! Uploaded documents and their public metadata view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters shown in a document preview
pub const PREVIEW_CHARS: usize = 200;

/// A document held in memory after a successful upload.
///
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    /// Extracted, trimmed text
    pub text: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    /// Size of the original PDF upload
    pub size_bytes: usize,
}

/// Metadata returned by `GET /document/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub document_id: String,
    pub filename: String,
    pub upload_time: DateTime<Utc>,
    pub text_length: usize,
    pub text_preview: String,
    pub file_size: usize,
}

impl StoredDocument {
    /// Length of the text in characters (not bytes)
    pub fn text_length(&self) -> usize {
        self.text.chars().count()
    }

    /// First [`PREVIEW_CHARS`] characters, with `...` appended when the text is longer
    pub fn preview(&self) -> String {
        preview(&self.text)
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            document_id: self.id.clone(),
            filename: self.filename.clone(),
            upload_time: self.uploaded_at,
            text_length: self.text_length(),
            text_preview: self.preview(),
            file_size: self.size_bytes,
        }
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
