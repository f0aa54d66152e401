//! Single-turn questions about a document

use std::sync::Arc;

use tracing::{error, info};

use crate::model::GenerativeModel;
use crate::prompts::chat_prompt;

/// Answers questions about a document's text
#[derive(Clone)]
pub struct ChatEngine {
    model: Arc<dyn GenerativeModel>,
}

impl ChatEngine {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Ask `question` about `text`.
    ///
    /// Model errors come back as an apology that includes the error text.
    pub async fn chat(&self, text: &str, question: &str) -> String {
        info!(model = self.model.name(), question_chars = question.chars().count(), "Answering chat question");

        match self.model.generate(&chat_prompt(text, question)).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                error!(error = %e, "Model call failed during chat");
                format!(
                    "I encountered an error while processing your question. Please try again. Error: {}",
                    e
                )
            }
        }
    }
}
