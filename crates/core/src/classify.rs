//! Classification result types.
//!
//! Produced by the classification engine, carried over the wire by the
//! `classify_query` tool, and consumed by the agent's routing rule.

use serde::{Deserialize, Serialize};

use crate::category::RoutePreference;

/// Per-category contributing scores, kept for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Category id this score belongs to
    pub category: String,

    /// Distinct keywords found as substrings of the normalized query
    pub keyword_hits: usize,

    /// Best token-overlap score against the category's example queries
    pub example_score: f32,

    /// Weighted combination of the two
    pub combined: f32,
}

/// The outcome of classifying one query. Ephemeral, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Winning category id (always a registered category)
    pub category: String,

    /// Confidence in [0, 1]; 0.0 means the fallback was assigned
    pub confidence: f32,

    /// Routing hint copied from the winning category
    pub route: RoutePreference,

    /// Scores for every category, in registry order
    pub scores: Vec<CategoryScore>,
}
