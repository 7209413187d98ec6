//! Stats tool: `get_server_stats`.

use std::sync::Arc;

use async_trait::async_trait;

use crabdesk_core::error::ToolError;
use crabdesk_core::support::ServerStats;
use crabdesk_core::tool::Tool;
use crabdesk_knowledge::KnowledgeIndex;
use crabdesk_store::SupportStore;

use crate::metrics::HostMetrics;

pub struct GetServerStatsTool {
    store: Arc<SupportStore>,
    index: Arc<KnowledgeIndex>,
    metrics: Arc<HostMetrics>,
}

impl GetServerStatsTool {
    pub fn new(
        store: Arc<SupportStore>,
        index: Arc<KnowledgeIndex>,
        metrics: Arc<HostMetrics>,
    ) -> Self {
        Self { store, index, metrics }
    }
}

#[async_trait]
impl Tool for GetServerStatsTool {
    fn name(&self) -> &str {
        "get_server_stats"
    }

    fn description(&self) -> &str {
        "Report host statistics: tool calls, errors, ticket counts by \
         category, customers, and indexed documents."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let store_stats = self.store.stats().await;
        let stats = ServerStats {
            tool_calls: self.metrics.tool_calls(),
            tool_errors: self.metrics.tool_errors(),
            tickets_created: store_stats.tickets_total,
            tickets_open: store_stats.tickets_open,
            tickets_by_category: store_stats.tickets_by_category,
            customers: store_stats.customers,
            knowledge_documents: self.index.document_count() as u64,
        };
        serde_json::to_value(stats).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().to_string(),
            reason: e.to_string(),
        })
    }
}
