use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("No text could be extracted from the PDF. The file might be image-based or corrupted.")]
    NoText,
}
