//! Error types for the crabdesk domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; component failures are
//! normalized into wire error codes only at the host boundary.

use thiserror::Error;

/// The top-level error type for all crabdesk operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Registry errors ---
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    // --- Knowledge errors ---
    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Host client errors ---
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    // --- Inference errors ---
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    // --- Agent errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("Duplicate category id: {0}")]
    DuplicateCategory(String),

    #[error("Fallback category not registered: {0}")]
    UnknownFallback(String),

    #[error("Registry has no categories")]
    Empty,
}

#[derive(Debug, Clone, Error)]
pub enum KnowledgeError {
    #[error("Knowledge index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Corpus load failed: {0}")]
    Corpus(String),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

/// Failures of the transport between the agent and its host subprocess.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to launch tool host: {0}")]
    SpawnFailed(String),

    #[error("Tool host channel closed: {0}")]
    ChannelClosed(String),

    #[error("Tool host did not become ready within {timeout_secs}s")]
    StartupTimeout { timeout_secs: u64 },

    #[error("Request '{method}' timed out after {timeout_secs}s")]
    RequestTimeout { method: String, timeout_secs: u64 },

    #[error("Wire protocol violation: {0}")]
    Protocol(String),

    #[error("Tool host answered [{code}]: {message}")]
    Wire { code: crate::wire::ErrorCode, message: String },
}

#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by inference service, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Inference not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed model reply: {0}")]
    MalformedReply(String),
}

/// Failures `process_query` can surface to the caller. Inference failures
/// are not here: they degrade into a flagged partial response instead.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Tool host unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Tool host did not become ready within {timeout_secs}s")]
    StartupTimeout { timeout_secs: u64 },

    #[error("Tool call '{tool}' failed: [{code}] {message}")]
    ToolFailed {
        tool: String,
        code: crate::wire::ErrorCode,
        message: String,
    },
}
