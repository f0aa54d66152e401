//! API handlers for the explainer server
//!
//! Provides REST endpoints for:
//! - Document upload and analysis
//! - Document chat
//! - Document metadata lookup

use std::sync::Arc;

use analysis_engine::{AnalysisOutcome, AnalysisResult, AnalysisStatus};
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared_types::{ChatReply, DocumentInfo, StoredDocument};
use tracing::{debug, error, info, warn};

use crate::error::ServerError;
use crate::state::AppState;

/// Largest accepted upload, in bytes
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Fewer extracted characters than this means the PDF is probably scanned
pub const MIN_TEXT_CHARS: usize = 50;

const NO_FILE_MESSAGE: &str = "No file selected";
const NOT_PDF_MESSAGE: &str = "Only PDF files are supported";
const EMPTY_FILE_MESSAGE: &str = "The uploaded file is empty";
const TOO_LARGE_MESSAGE: &str = "File size must be less than 10MB";
const INSUFFICIENT_TEXT_MESSAGE: &str = "Document appears to contain insufficient text. Please ensure the PDF contains readable text (not just images).";

const UNKNOWN_DOCUMENT_REPLY: &str =
    "I couldn't find the document you're referring to. Please try uploading your document again.";
const NO_DOCUMENT_REPLY: &str = "Please upload a document first before asking questions.";

/// Root response
#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
}

/// Handler: GET /
pub async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "AI Legal Document Explainer API",
        status: "running",
    })
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub gemini_configured: bool,
    pub documents_stored: usize,
    pub stored_document_ids: Vec<String>,
}

/// Handler: GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "explainer-server",
        version: env!("CARGO_PKG_VERSION"),
        gemini_configured: state.model_configured(),
        documents_stored: state.store.len().await,
        stored_document_ids: state.store.ids().await,
    })
}

/// Upload response
#[derive(Serialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub filename: String,
    pub analysis: AnalysisResult,
    /// Extracted text length in characters
    pub text_length: usize,
    pub analysis_status: AnalysisStatus,
}

/// The `file` part of an upload form
struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// Handler: POST /upload-document
pub async fn handle_upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    let Upload { filename, bytes } = read_upload(&mut multipart).await?;
    let size_bytes = bytes.len();
    info!(filename = %filename, size_bytes, "Processing upload");

    let text = tokio::task::spawn_blocking(move || shared_pdf::extract_text(&bytes))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

    let text_length = text.chars().count();
    if text_length < MIN_TEXT_CHARS {
        return Err(ServerError::InvalidInput(
            INSUFFICIENT_TEXT_MESSAGE.to_string(),
        ));
    }

    let engine = state.analysis_engine()?;

    let uploaded_at = Utc::now();
    let document_id = state.id_scheme.generate(&text, uploaded_at);
    let document = Arc::new(StoredDocument {
        id: document_id.clone(),
        text,
        filename: filename.clone(),
        uploaded_at,
        size_bytes,
    });
    state.store.insert(document.clone()).await;
    info!(document_id = %document_id, text_length, "Stored document");

    let analysis = tokio::spawn(async move { engine.analyze(&document.text).await }).await;
    let outcome = match analysis {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(document_id = %document_id, error = %e, "Analysis task failed");
            state.store.remove(&document_id).await;
            info!(document_id = %document_id, "Removed document after failed analysis");
            return Err(ServerError::Internal(e.to_string()));
        }
    };

    match &outcome {
        AnalysisOutcome::Completed(_) => {
            debug!(document_id = %document_id, "Analysis finished");
        }
        AnalysisOutcome::ParseFallback { excerpt } => {
            warn!(document_id = %document_id, response = %excerpt, "Using parse fallback analysis");
        }
        AnalysisOutcome::CallFallback { reason } => {
            warn!(document_id = %document_id, reason = %reason, "Using call fallback analysis");
        }
    }
    let analysis_status = outcome.status();

    Ok(Json(UploadResponse {
        document_id,
        filename,
        analysis: outcome.into_result(),
        text_length,
        analysis_status,
    }))
}

/// Pull the `file` part out of the form, enforcing name, type and size rules
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ServerError> {
    while let Some(mut field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ServerError::InvalidInput(NO_FILE_MESSAGE.to_string()))?;

        if !is_pdf_filename(&filename) {
            return Err(ServerError::InvalidInput(NOT_PDF_MESSAGE.to_string()));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(upload_error)? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(ServerError::InvalidInput(TOO_LARGE_MESSAGE.to_string()));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(ServerError::InvalidInput(EMPTY_FILE_MESSAGE.to_string()));
        }
        return Ok(Upload { filename, bytes });
    }

    Err(ServerError::InvalidInput(NO_FILE_MESSAGE.to_string()))
}

fn upload_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::InvalidInput(TOO_LARGE_MESSAGE.to_string())
    } else {
        ServerError::InvalidInput(format!("Invalid upload: {}", e.body_text()))
    }
}

/// Case-insensitive `.pdf` extension check
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".pdf")
}

/// Chat request body
#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Stored document to ask about; takes precedence over `document_text`
    pub document_id: Option<String>,
    /// Inline document text, used when no `document_id` is given
    pub document_text: Option<String>,
}

/// Handler: POST /chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ServerError> {
    let engine = state.chat_engine()?;

    let document_id = non_empty(request.document_id);
    let document_text = non_empty(request.document_text);

    let text = match (document_id, document_text) {
        (Some(id), _) => match state.store.get(&id).await {
            Some(document) => {
                debug!(document_id = %id, "Chatting about stored document");
                document.text.clone()
            }
            None => {
                info!(document_id = %id, "Chat requested for unknown document");
                return Ok(Json(ChatReply::now(UNKNOWN_DOCUMENT_REPLY)));
            }
        },
        (None, Some(text)) => text,
        (None, None) => return Ok(Json(ChatReply::now(NO_DOCUMENT_REPLY))),
    };

    let response = engine.chat(&text, &request.message).await;
    Ok(Json(ChatReply::now(response)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Handler: GET /document/:document_id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentInfo>, ServerError> {
    state
        .store
        .get(&document_id)
        .await
        .map(|document| Json(document.info()))
        .ok_or(ServerError::DocumentNotFound(document_id))
}
