//! Inference backends for crabdesk.
//!
//! All backends implement the `crabdesk_core::InferenceClient` trait;
//! [`reply`] interprets what comes back.

pub mod http;
pub mod reply;

pub use http::HttpInferenceClient;
pub use reply::{ReplyAction, StructuredReply, parse_reply};
