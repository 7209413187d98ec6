//! # crabdesk Core
//!
//! Domain types, traits, and error definitions for the crabdesk support
//! agent. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem seam is defined as a trait here (`Tool`,
//! `InferenceClient`). Implementations live in their respective crates.
//! This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod category;
pub mod classify;
pub mod error;
pub mod inference;
pub mod knowledge;
pub mod support;
pub mod tool;
pub mod wire;

// Re-export key types at crate root for ergonomics
pub use category::{CategoryDefinition, CategoryRegistry, RoutePreference};
pub use classify::{CategoryScore, ClassificationResult};
pub use error::{Error, Result};
pub use inference::{InferenceClient, InferenceReply, InferenceRequest};
pub use knowledge::{Document, KnowledgeChunk, SearchHit};
pub use support::{CategoryCount, Customer, ServerStats, StoreStats, Ticket, TicketStatus};
pub use tool::{Tool, ToolRegistry};
pub use wire::{ErrorCode, InitializeResult, ToolSpec, WireError, WireRequest, WireResponse};
