//! The tool catalog.
//!
//! One module per concern, one `Tool` impl per operation. Registration
//! order in [`default_registry`] is the order `tools/list` reports, so
//! new tools go at the end.

mod classify;
mod customer;
mod knowledge;
mod stats;
mod ticket;

pub use classify::{ClassifyQueryTool, GetQueryTemplateTool};
pub use customer::LookupCustomerTool;
pub use knowledge::{GetKnowledgeForQueryTool, SearchKnowledgeTool};
pub use stats::GetServerStatsTool;
pub use ticket::{CreateTicketTool, GetTicketsTool};

use std::sync::Arc;

use crabdesk_classifier::Classifier;
use crabdesk_core::category::CategoryRegistry;
use crabdesk_core::tool::ToolRegistry;
use crabdesk_knowledge::KnowledgeIndex;
use crabdesk_store::SupportStore;

use crate::metrics::HostMetrics;

/// Build the full eight-tool registry over shared components.
pub fn default_registry(
    categories: Arc<CategoryRegistry>,
    classifier: Arc<Classifier>,
    index: Arc<KnowledgeIndex>,
    store: Arc<SupportStore>,
    metrics: Arc<HostMetrics>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ClassifyQueryTool::new(classifier)));
    registry.register(Box::new(GetQueryTemplateTool::new(categories.clone())));
    registry.register(Box::new(GetKnowledgeForQueryTool::new(
        categories,
        index.clone(),
    )));
    registry.register(Box::new(SearchKnowledgeTool::new(index.clone())));
    registry.register(Box::new(LookupCustomerTool::new(store.clone())));
    registry.register(Box::new(CreateTicketTool::new(store.clone())));
    registry.register(Box::new(GetTicketsTool::new(store.clone())));
    registry.register(Box::new(GetServerStatsTool::new(store, index, metrics)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_eight_tools_in_order() {
        let categories = Arc::new(CategoryRegistry::builtin());
        let classifier = Arc::new(Classifier::new(categories.clone(), 1.0, 1.0));
        let mut index = KnowledgeIndex::new(60, 12);
        index.build(&crate::corpus::builtin_documents()).unwrap();
        let store = Arc::new(SupportStore::with_demo_data(categories.clone()));
        let metrics = Arc::new(HostMetrics::new());

        let registry = default_registry(
            categories,
            classifier,
            Arc::new(index),
            store,
            metrics,
        );
        assert_eq!(
            registry.names(),
            vec![
                "classify_query",
                "get_query_template",
                "get_knowledge_for_query",
                "search_knowledge",
                "lookup_customer",
                "create_ticket",
                "get_tickets",
                "get_server_stats",
            ]
        );
    }
}
