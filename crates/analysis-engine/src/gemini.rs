//! Gemini `generateContent` client

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{GenerativeModel, ModelError};

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Connection settings for the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Scheme and host, without trailing slash
    pub base_url: String,
    /// Applies to the whole request, connect through body
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

/// HTTP client for a single Gemini model
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Build a client. An empty API key counts as not configured.
    pub fn new(config: GeminiConfig) -> Result<Self, ModelError> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::NotConfigured);
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        info!(model = %self.config.model, prompt_chars = prompt.chars().count(), "Sending request to Gemini API");
        let resp = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp.text().await?;
        let text = reply_text(&raw)?;
        debug!(chars = text.chars().count(), "Received response from Gemini API");
        Ok(text)
    }
}

/// Concatenated text parts of the first candidate
fn reply_text(raw: &str) -> Result<String, ModelError> {
    let response: GenerateContentResponse = serde_json::from_str(raw)?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(ModelError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "empty candidate".to_string());
        return Err(ModelError::EmptyResponse(reason));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_includes_model() {
        let config = GeminiConfig::new("key")
            .with_model("gemini-1.5-pro")
            .with_base_url("http://localhost:9000/");
        assert_eq!(
            config.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_empty_key_is_not_configured() {
        let result = GeminiClient::new(GeminiConfig::new("   "));
        assert!(matches!(result, Err(ModelError::NotConfigured)));
    }

    #[test]
    fn test_client_reports_model_name() {
        let client = GeminiClient::new(GeminiConfig::new("key")).unwrap();
        assert_eq!(client.name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_reply_text_joins_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "{\"summary\": "}, {"text": "\"ok\"}"}], "role": "model"},
                "finishReason": "STOP"
            }]
        }"#;
        assert_eq!(reply_text(raw).unwrap(), r#"{"summary": "ok"}"#);
    }

    #[test]
    fn test_blocked_prompt_is_error() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        match reply_text(raw) {
            Err(ModelError::EmptyResponse(reason)) => assert_eq!(reason, "SAFETY"),
            other => panic!("expected EmptyResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_candidate_without_text_is_error() {
        let raw = r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#;
        assert!(matches!(reply_text(raw), Err(ModelError::EmptyResponse(r)) if r == "MAX_TOKENS"));
    }

    #[test]
    fn test_malformed_body_is_json_error() {
        assert!(matches!(reply_text("<html>"), Err(ModelError::Json(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hello" }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]}));
    }

    mod http {
        //! `generate` against a local axum server standing in for the Gemini API

        use std::time::Duration;

        use axum::{
            http::{HeaderMap, StatusCode},
            routing::post,
            Json, Router,
        };
        use pretty_assertions::assert_eq;
        use serde_json::{json, Value};

        use super::*;

        const TEST_KEY: &str = "test-key";

        /// Serve `app` on an ephemeral port and return its base URL
        async fn serve(app: Router) -> String {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            format!("http://{addr}")
        }

        fn client(base_url: &str, api_key: &str) -> GeminiClient {
            GeminiClient::new(
                GeminiConfig::new(api_key)
                    .with_base_url(base_url)
                    .with_timeout(Duration::from_millis(100)),
            )
            .unwrap()
        }

        /// Echoes the prompt back when the key header is present
        async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
            let key = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok());
            if key != Some(TEST_KEY) {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "API key not valid"}})),
                );
            }
            let prompt = body["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap_or_default();
            (
                StatusCode::OK,
                Json(json!({
                    "candidates": [{
                        "content": {"parts": [{"text": format!("echo: {prompt}")}], "role": "model"},
                        "finishReason": "STOP"
                    }]
                })),
            )
        }

        fn echo_router() -> Router {
            Router::new().route("/v1beta/models/:model", post(echo))
        }

        #[tokio::test]
        async fn test_generate_sends_key_header() {
            let base_url = serve(echo_router()).await;
            let reply = client(&base_url, TEST_KEY).generate("hello").await.unwrap();
            assert_eq!(reply, "echo: hello");
        }

        #[tokio::test]
        async fn test_rejected_key_is_api_error() {
            let base_url = serve(echo_router()).await;
            match client(&base_url, "wrong-key").generate("hello").await {
                Err(ModelError::Api { status, body }) => {
                    assert_eq!(status, 401);
                    assert!(body.contains("API key not valid"));
                }
                other => panic!("expected Api error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_rate_limited_is_api_error() {
            let app = Router::new().route(
                "/v1beta/models/:model",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exhausted") }),
            );
            let base_url = serve(app).await;

            match client(&base_url, TEST_KEY).generate("hello").await {
                Err(ModelError::Api { status, body }) => {
                    assert_eq!(status, 429);
                    assert_eq!(body, "quota exhausted");
                }
                other => panic!("expected Api error, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_slow_reply_times_out() {
            let app = Router::new().route(
                "/v1beta/models/:model",
                post(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "too late"
                }),
            );
            let base_url = serve(app).await;

            let result = client(&base_url, TEST_KEY).generate("hello").await;
            match result {
                Err(ModelError::Http(e)) => assert!(e.is_timeout()),
                other => panic!("expected Http timeout, got {:?}", other),
            }
        }
    }
}
