//! The generative model seam

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Gemini API key not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no text: {0}")]
    EmptyResponse(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A text-in, text-out generation capability.
///
/// One call per prompt, no conversation state.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Short identifier used in logs, e.g. `gemini-1.5-flash`
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::sync::Mutex;

    use super::*;

    /// Model that returns a fixed reply and records every prompt
    pub(crate) struct ScriptedModel {
        reply: Result<String, String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(body: &str) -> Self {
            Self {
                reply: Err(body.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(body) => Err(ModelError::Api {
                    status: 503,
                    body: body.clone(),
                }),
            }
        }
    }
}
