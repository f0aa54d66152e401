//! Structured document analysis

use std::sync::Arc;

use serde::Serialize;
use shared_types::AnalysisResult;
use tracing::{error, info, warn};

use crate::model::GenerativeModel;
use crate::prompts::{analysis_prompt, MAX_DOCUMENT_CHARS};
use crate::response::{excerpt, parse_analysis, ReplyError};

/// How an analysis request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// The model replied with a usable JSON object
    Completed(AnalysisResult),
    /// The model replied, but not with JSON
    ParseFallback { excerpt: String },
    /// The model call failed, or its JSON did not have the analysis shape
    CallFallback { reason: String },
}

/// Wire label for an [`AnalysisOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Completed,
    ParseFallback,
    CallFallback,
}

impl AnalysisOutcome {
    pub fn status(&self) -> AnalysisStatus {
        match self {
            AnalysisOutcome::Completed(_) => AnalysisStatus::Completed,
            AnalysisOutcome::ParseFallback { .. } => AnalysisStatus::ParseFallback,
            AnalysisOutcome::CallFallback { .. } => AnalysisStatus::CallFallback,
        }
    }

    /// The record to show the user; fallbacks map to their canned records
    pub fn into_result(self) -> AnalysisResult {
        match self {
            AnalysisOutcome::Completed(result) => result,
            AnalysisOutcome::ParseFallback { .. } => AnalysisResult::parse_fallback(),
            AnalysisOutcome::CallFallback { .. } => AnalysisResult::call_fallback(),
        }
    }
}

/// Runs the structured analysis prompt against a model
#[derive(Clone)]
pub struct AnalysisEngine {
    model: Arc<dyn GenerativeModel>,
}

impl AnalysisEngine {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Analyze document text. Never fails; see [`AnalysisOutcome`].
    pub async fn analyze(&self, text: &str) -> AnalysisOutcome {
        info!(
            model = self.model.name(),
            chars = text.chars().count().min(MAX_DOCUMENT_CHARS),
            "Starting document analysis"
        );

        let reply = match self.model.generate(&analysis_prompt(text)).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Model call failed during analysis");
                return AnalysisOutcome::CallFallback {
                    reason: e.to_string(),
                };
            }
        };

        match parse_analysis(&reply) {
            Ok(result) => {
                info!(
                    key_clauses = result.key_clauses.len(),
                    risks = result.risks.len(),
                    "Parsed analysis response"
                );
                AnalysisOutcome::Completed(result)
            }
            Err(ReplyError::Syntax(e)) => {
                let excerpt = excerpt(&reply, 500);
                warn!(error = %e, response = %excerpt, "Analysis response was not valid JSON");
                AnalysisOutcome::ParseFallback { excerpt }
            }
            Err(e @ ReplyError::Shape(_)) => {
                error!(error = %e, "Analysis response could not be mapped");
                AnalysisOutcome::CallFallback {
                    reason: e.to_string(),
                }
            }
        }
    }
}
