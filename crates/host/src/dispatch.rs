//! Request dispatch and the host lifecycle state machine.
//!
//! A [`ToolHost`] moves `Uninitialized → Ready → ShuttingDown` and never
//! back. Every request outside `Ready` is answered `host_closed`;
//! `tools/call` arguments are validated against the tool's declared
//! schema before the tool runs, so tools can assume well-shaped input.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crabdesk_core::wire::{
    ErrorCode, InitializeResult, METHOD_INITIALIZE, METHOD_SHUTDOWN, METHOD_TOOLS_CALL,
    METHOD_TOOLS_LIST, ToolCallParams, WireError, WireRequest, WireResponse,
};
use crabdesk_core::tool::ToolRegistry;

use crate::metrics::HostMetrics;
use crate::schema;

/// Host lifecycle. Transitions are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Uninitialized,
    Ready,
    ShuttingDown,
}

/// The dispatch core: a tool catalog plus the lifecycle gate in front
/// of it.
pub struct ToolHost {
    server: String,
    version: String,
    state: Mutex<HostState>,
    registry: ToolRegistry,
    metrics: Arc<HostMetrics>,
}

impl ToolHost {
    /// An empty host. It answers `host_closed` until [`install`] hands
    /// it a catalog.
    ///
    /// [`install`]: ToolHost::install
    pub fn new(server: impl Into<String>, metrics: Arc<HostMetrics>) -> Self {
        Self {
            server: server.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            state: Mutex::new(HostState::Uninitialized),
            registry: ToolRegistry::new(),
            metrics,
        }
    }

    /// Install the tool catalog and become `Ready`.
    pub fn install(&mut self, registry: ToolRegistry) {
        self.registry = registry;
        *self.state.lock().unwrap() = HostState::Ready;
        info!(tools = self.registry.len(), "host ready");
    }

    pub fn state(&self) -> HostState {
        *self.state.lock().unwrap()
    }

    /// Stop accepting requests. Idempotent.
    pub fn begin_shutdown(&self) {
        *self.state.lock().unwrap() = HostState::ShuttingDown;
    }

    pub fn metrics(&self) -> &HostMetrics {
        &self.metrics
    }

    /// Dispatch one request. Always produces a response carrying the
    /// request's id; protocol-level problems come back as wire errors,
    /// never as a dropped line.
    pub async fn handle(&self, request: WireRequest) -> WireResponse {
        if self.state() != HostState::Ready {
            return WireResponse::err(
                request.id,
                ErrorCode::HostClosed,
                "host is not accepting requests",
            );
        }

        match request.method.as_str() {
            METHOD_INITIALIZE => {
                info!(server = %self.server, "initialize");
                let result = InitializeResult {
                    server: self.server.clone(),
                    version: self.version.clone(),
                    tool_count: self.registry.len(),
                };
                match serde_json::to_value(result) {
                    Ok(value) => WireResponse::ok(request.id, value),
                    Err(e) => WireResponse::err(request.id, ErrorCode::Internal, e.to_string()),
                }
            }
            METHOD_TOOLS_LIST => {
                let specs = self.registry.specs();
                WireResponse::ok(request.id, serde_json::json!({ "tools": specs }))
            }
            METHOD_TOOLS_CALL => self.handle_tool_call(request).await,
            METHOD_SHUTDOWN => {
                info!("shutdown requested");
                self.begin_shutdown();
                WireResponse::ok(request.id, serde_json::json!({}))
            }
            other => WireResponse::err(
                request.id,
                ErrorCode::InvalidArguments,
                format!("unknown method '{other}'"),
            ),
        }
    }

    async fn handle_tool_call(&self, request: WireRequest) -> WireResponse {
        self.metrics.record_call();

        let params: ToolCallParams = match request.params {
            Some(value) => match serde_json::from_value(value) {
                Ok(params) => params,
                Err(e) => {
                    self.metrics.record_error();
                    return WireResponse::err(
                        request.id,
                        ErrorCode::InvalidArguments,
                        format!("malformed tools/call params: {e}"),
                    );
                }
            },
            None => {
                self.metrics.record_error();
                return WireResponse::err(
                    request.id,
                    ErrorCode::InvalidArguments,
                    "tools/call requires params",
                );
            }
        };

        let Some(tool) = self.registry.get(&params.name) else {
            self.metrics.record_error();
            warn!(tool = %params.name, "unknown tool");
            return WireResponse::err(
                request.id,
                ErrorCode::UnknownTool,
                format!("unknown tool '{}'", params.name),
            );
        };

        if let Err(violation) = schema::validate(&tool.parameters_schema(), &params.arguments) {
            self.metrics.record_error();
            warn!(tool = %params.name, %violation, "rejected arguments");
            return WireResponse::err(request.id, ErrorCode::InvalidArguments, violation);
        }

        debug!(tool = %params.name, "dispatching");
        match tool.execute(params.arguments).await {
            Ok(result) => WireResponse::ok(request.id, result),
            Err(e) => {
                self.metrics.record_error();
                let wire = WireError::from_tool_error(&e);
                warn!(tool = %params.name, code = %wire.code, error = %e, "tool failed");
                WireResponse {
                    id: request.id,
                    result: None,
                    error: Some(wire),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crabdesk_classifier::Classifier;
    use crabdesk_core::category::CategoryRegistry;
    use crabdesk_knowledge::KnowledgeIndex;
    use crabdesk_store::SupportStore;
    use serde_json::json;

    fn ready_host() -> ToolHost {
        let categories = Arc::new(CategoryRegistry::builtin());
        let classifier = Arc::new(Classifier::new(categories.clone(), 1.0, 1.0));
        let mut index = KnowledgeIndex::new(60, 12);
        index.build(&crate::corpus::builtin_documents()).unwrap();
        let store = Arc::new(SupportStore::with_demo_data(categories.clone()));
        let metrics = Arc::new(HostMetrics::new());

        let registry = crate::tools::default_registry(
            categories,
            classifier,
            Arc::new(index),
            store,
            metrics.clone(),
        );
        let mut host = ToolHost::new("crabdesk-host", metrics);
        host.install(registry);
        host
    }

    fn call(id: u64, name: &str, arguments: serde_json::Value) -> WireRequest {
        WireRequest {
            id,
            method: METHOD_TOOLS_CALL.into(),
            params: Some(json!({ "name": name, "arguments": arguments })),
        }
    }

    #[tokio::test]
    async fn uninitialized_host_answers_host_closed() {
        let host = ToolHost::new("crabdesk-host", Arc::new(HostMetrics::new()));
        assert_eq!(host.state(), HostState::Uninitialized);

        let resp = host
            .handle(WireRequest { id: 1, method: METHOD_INITIALIZE.into(), params: None })
            .await;
        assert_eq!(resp.error.unwrap().code, ErrorCode::HostClosed);
    }

    #[tokio::test]
    async fn initialize_reports_catalog_size() {
        let host = ready_host();
        let resp = host
            .handle(WireRequest { id: 7, method: METHOD_INITIALIZE.into(), params: None })
            .await;
        assert_eq!(resp.id, 7);
        let result: InitializeResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(result.server, "crabdesk-host");
        assert_eq!(result.tool_count, 8);
    }

    #[tokio::test]
    async fn tools_list_is_in_registration_order() {
        let host = ready_host();
        let resp = host
            .handle(WireRequest { id: 2, method: METHOD_TOOLS_LIST.into(), params: None })
            .await;
        let result = resp.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 8);
        assert_eq!(tools[0]["name"], "classify_query");
        assert_eq!(tools[7]["name"], "get_server_stats");
    }

    #[tokio::test]
    async fn tool_call_roundtrip() {
        let host = ready_host();
        let resp = host
            .handle(call(3, "classify_query", json!({"query": "reset my password"})))
            .await;
        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap()["category"], "account_security");
        assert_eq!(host.metrics().tool_calls(), 1);
        assert_eq!(host.metrics().tool_errors(), 0);
    }

    #[tokio::test]
    async fn unknown_tool_is_counted_as_an_error() {
        let host = ready_host();
        let resp = host.handle(call(4, "summon_manager", json!({}))).await;
        assert_eq!(resp.error.unwrap().code, ErrorCode::UnknownTool);
        assert_eq!(host.metrics().tool_calls(), 1);
        assert_eq!(host.metrics().tool_errors(), 1);
    }

    #[tokio::test]
    async fn schema_violation_is_rejected_before_execution() {
        let host = ready_host();
        // classify_query requires a string `query`.
        let resp = host.handle(call(5, "classify_query", json!({"query": 42}))).await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, ErrorCode::InvalidArguments);
        assert!(err.message.contains("query"));
        assert_eq!(host.metrics().tool_errors(), 1);
    }

    #[tokio::test]
    async fn missing_params_is_invalid_arguments() {
        let host = ready_host();
        let resp = host
            .handle(WireRequest { id: 6, method: METHOD_TOOLS_CALL.into(), params: None })
            .await;
        assert_eq!(resp.error.unwrap().code, ErrorCode::InvalidArguments);
    }

    #[tokio::test]
    async fn unknown_method_is_invalid_arguments() {
        let host = ready_host();
        let resp = host
            .handle(WireRequest { id: 8, method: "tools/ponder".into(), params: None })
            .await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, ErrorCode::InvalidArguments);
        assert!(err.message.contains("tools/ponder"));
    }

    #[tokio::test]
    async fn shutdown_is_acknowledged_then_everything_is_host_closed() {
        let host = ready_host();
        let resp = host
            .handle(WireRequest { id: 9, method: METHOD_SHUTDOWN.into(), params: None })
            .await;
        assert!(resp.error.is_none());
        assert_eq!(host.state(), HostState::ShuttingDown);

        let resp = host
            .handle(call(10, "classify_query", json!({"query": "hi"})))
            .await;
        assert_eq!(resp.error.unwrap().code, ErrorCode::HostClosed);
        // The gate rejects before the dispatch counter.
        assert_eq!(host.metrics().tool_calls(), 0);
    }

    #[tokio::test]
    async fn stats_tool_sees_the_dispatch_counters() {
        let host = ready_host();
        host.handle(call(11, "classify_query", json!({"query": "refund"}))).await;
        host.handle(call(12, "summon_manager", json!({}))).await;

        let resp = host.handle(call(13, "get_server_stats", json!({}))).await;
        let stats = resp.result.unwrap();
        // The stats call itself is the third dispatch.
        assert_eq!(stats["tool_calls"], 3);
        assert_eq!(stats["tool_errors"], 1);
    }
}
