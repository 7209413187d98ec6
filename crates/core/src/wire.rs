//! Wire protocol between the agent and the tool host.
//!
//! Framing is newline-delimited JSON: one `WireRequest` per line in, one
//! `WireResponse` per line out. Lines are self-delimiting, so a malformed
//! line can be answered with an error and the stream stays usable.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ToolError;

/// Protocol method names.
pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";
pub const METHOD_SHUTDOWN: &str = "shutdown";

/// Normalized error codes. Everything a tool can fail with maps onto one
/// of these before it crosses the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidArguments,
    UnknownTool,
    NotFound,
    IndexUnavailable,
    HostClosed,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArguments => "invalid_arguments",
            ErrorCode::UnknownTool => "unknown_tool",
            ErrorCode::NotFound => "not_found",
            ErrorCode::IndexUnavailable => "index_unavailable",
            ErrorCode::HostClosed => "host_closed",
            ErrorCode::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRequest {
    /// Caller-assigned id, echoed in the response
    pub id: u64,

    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// One response line. Exactly one of `result` / `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResponse {
    pub id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl WireResponse {
    pub fn ok(id: u64, result: serde_json::Value) -> Self {
        Self { id, result: Some(result), error: None }
    }

    pub fn err(id: u64, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(WireError { code, message: message.into() }),
        }
    }
}

/// The error half of a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireError {
    pub code: ErrorCode,
    pub message: String,
}

impl WireError {
    /// Normalize a tool failure into its wire form. Component-level kinds
    /// that callers cannot act on distinctly (`UnknownCategory`,
    /// `CustomerNotFound`) collapse to `not_found`.
    pub fn from_tool_error(err: &ToolError) -> Self {
        let code = match err {
            ToolError::UnknownTool(_) => ErrorCode::UnknownTool,
            ToolError::InvalidArguments(_) => ErrorCode::InvalidArguments,
            ToolError::Store(_) => ErrorCode::NotFound,
            ToolError::Knowledge(crate::error::KnowledgeError::IndexUnavailable(_)) => {
                ErrorCode::IndexUnavailable
            }
            ToolError::Knowledge(crate::error::KnowledgeError::Corpus(_)) => ErrorCode::Internal,
            ToolError::ExecutionFailed { .. } => ErrorCode::Internal,
        };
        Self { code, message: err.to_string() }
    }
}

/// Catalog entry returned by `tools/list`, in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments
    pub parameters: serde_json::Value,
}

/// `initialize` result payload, the ready handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    pub server: String,
    pub version: String,
    pub tool_count: usize,
}

/// `tools/call` params payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    pub name: String,

    #[serde(default)]
    pub arguments: serde_json::Value,
}
