//! InferenceClient trait — the abstraction over the external model backend.
//!
//! The agent assembles a prompt and asks for one completion. Which service
//! answers (hosted chat-completions API, local stub in tests) is invisible
//! to the workflow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// One completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// The fully assembled prompt
    pub prompt: String,

    /// Temperature (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    500
}

impl InferenceRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// The completion text plus which model produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceReply {
    pub text: String,
    pub model: String,
}

/// The core InferenceClient trait.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// A human-readable name for this backend (e.g., "huggingface").
    fn name(&self) -> &str;

    /// Send a prompt and get one completion back.
    async fn complete(
        &self,
        request: InferenceRequest,
    ) -> std::result::Result<InferenceReply, InferenceError>;
}
