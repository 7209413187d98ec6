//! OpenAI-compatible chat-completions client.
//!
//! Works with any endpoint exposing `/v1/chat/completions`: the Hugging
//! Face router, OpenAI, vLLM, Ollama. One prompt in, one completion out;
//! the agent never streams.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crabdesk_core::error::InferenceError;
use crabdesk_core::inference::{InferenceClient, InferenceReply, InferenceRequest};

/// An OpenAI-compatible inference backend.
pub struct HttpInferenceClient {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl HttpInferenceClient {
    /// Create a client for any OpenAI-compatible endpoint. An empty
    /// `api_key` is allowed; calls then fail with `NotConfigured` so the
    /// agent can degrade instead of crashing at startup.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Create a Hugging Face router client (convenience constructor).
    pub fn huggingface(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Self {
        Self::new(
            "huggingface",
            "https://router.huggingface.co/v1",
            api_key,
            model,
            timeout,
        )
    }

    fn extract_reply(api_response: ApiResponse) -> Result<InferenceReply, InferenceError> {
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let text = choice.message.content.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(InferenceError::MalformedReply("empty completion".into()));
        }

        Ok(InferenceReply {
            text,
            model: api_response.model,
        })
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: InferenceRequest,
    ) -> std::result::Result<InferenceReply, InferenceError> {
        if self.api_key.is_empty() {
            return Err(InferenceError::NotConfigured(
                "no API key set (HF_TOKEN or [inference].api_key)".into(),
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "stream": false,
        });

        debug!(backend = %self.name, model = %self.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout(e.to_string())
                } else {
                    InferenceError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(InferenceError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(InferenceError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Inference backend returned error");
            return Err(InferenceError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| InferenceError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        Self::extract_reply(api_response)
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}
