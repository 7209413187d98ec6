//! Session counters kept by the agent.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Per-session workflow counters. A query counts as resolved when the
/// inference call succeeded and produced non-empty text; degraded
/// answers do not count.
#[derive(Debug, Default)]
pub struct AgentMetrics {
    total_queries: AtomicU64,
    resolved_queries: AtomicU64,
    tickets_created: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_queries: u64,
    pub resolved_queries: u64,
    pub tickets_created: u64,
}

impl AgentMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&self) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resolved(&self) {
        self.resolved_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ticket(&self) {
        self.tickets_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            resolved_queries: self.resolved_queries.load(Ordering::Relaxed),
            tickets_created: self.tickets_created.load(Ordering::Relaxed),
        }
    }
}
