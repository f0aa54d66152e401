//! Shared application state

use std::sync::Arc;

use analysis_engine::{AnalysisEngine, ChatEngine, GenerativeModel};

use crate::error::ServerError;
use crate::store::{DocumentStore, IdScheme};

/// Handles shared by every request
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    /// `None` when no API key was configured
    pub model: Option<Arc<dyn GenerativeModel>>,
    pub id_scheme: IdScheme,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>, id_scheme: IdScheme) -> Self {
        Self {
            store: DocumentStore::new(),
            model,
            id_scheme,
        }
    }

    pub fn model_configured(&self) -> bool {
        self.model.is_some()
    }

    pub fn analysis_engine(&self) -> Result<AnalysisEngine, ServerError> {
        self.model
            .clone()
            .map(AnalysisEngine::new)
            .ok_or(ServerError::NotConfigured)
    }

    pub fn chat_engine(&self) -> Result<ChatEngine, ServerError> {
        self.model
            .clone()
            .map(ChatEngine::new)
            .ok_or(ServerError::NotConfigured)
    }
}
