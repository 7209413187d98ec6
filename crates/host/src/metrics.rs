//! Dispatch counters, reported through `get_server_stats`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Tool-call and error counters. The dispatch loop is the only writer;
/// relaxed ordering is enough for reporting.
#[derive(Debug, Default)]
pub struct HostMetrics {
    tool_calls: AtomicU64,
    tool_errors: AtomicU64,
}

impl HostMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&self) {
        self.tool_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.tool_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tool_calls(&self) -> u64 {
        self.tool_calls.load(Ordering::Relaxed)
    }

    pub fn tool_errors(&self) -> u64 {
        self.tool_errors.load(Ordering::Relaxed)
    }
}
