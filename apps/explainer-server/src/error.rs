//! Error types for the explainer server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared_pdf::ExtractionError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Error extracting text from PDF: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Gemini API key not configured")]
    NotConfigured,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    code: &'static str,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match &self {
            ServerError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
            }
            ServerError::Extraction(_) => {
                (StatusCode::BAD_REQUEST, "EXTRACTION_FAILED", self.to_string())
            }
            ServerError::DocumentNotFound(_) => (
                StatusCode::NOT_FOUND,
                "DOCUMENT_NOT_FOUND",
                "Document not found".to_string(),
            ),
            ServerError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "NOT_CONFIGURED",
                "Gemini API key not configured. Please set GEMINI_API_KEY in your environment variables.".to_string(),
            ),
            ServerError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                format!(
                    "An unexpected error occurred while processing your document. Please try again. Error: {}",
                    msg
                ),
            ),
        };

        if status.is_server_error() {
            tracing::error!(code, "{}", self);
        } else {
            tracing::warn!(code, "{}", self);
        }

        (status, Json(ErrorResponse { detail, code })).into_response()
    }
}
