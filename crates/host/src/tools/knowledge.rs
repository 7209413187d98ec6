//! Knowledge tools: `get_knowledge_for_query` and `search_knowledge`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crabdesk_core::category::CategoryRegistry;
use crabdesk_core::error::{StoreError, ToolError};
use crabdesk_core::knowledge::SearchHit;
use crabdesk_core::tool::Tool;
use crabdesk_knowledge::KnowledgeIndex;

fn default_max_results() -> usize {
    3
}

fn default_search_results() -> usize {
    5
}

/// Join hits into one context block with source attributions.
fn knowledge_text(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No relevant documentation found.".to_string();
    }
    hits.iter()
        .map(|hit| format!("[Source: {}]\n{}", hit.source, hit.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Source names in hit order, deduplicated.
fn sources(hits: &[SearchHit]) -> Vec<String> {
    let mut seen = Vec::new();
    for hit in hits {
        if !seen.contains(&hit.source) {
            seen.push(hit.source.clone());
        }
    }
    seen
}

/// Category-scoped retrieval for the support workflow.
pub struct GetKnowledgeForQueryTool {
    registry: Arc<CategoryRegistry>,
    index: Arc<KnowledgeIndex>,
}

impl GetKnowledgeForQueryTool {
    pub fn new(registry: Arc<CategoryRegistry>, index: Arc<KnowledgeIndex>) -> Self {
        Self { registry, index }
    }
}

#[derive(Deserialize)]
struct GetKnowledgeParams {
    category: String,
    query: String,
    #[serde(default = "default_max_results")]
    max_results: usize,
}

#[async_trait]
impl Tool for GetKnowledgeForQueryTool {
    fn name(&self) -> &str {
        "get_knowledge_for_query"
    }

    fn description(&self) -> &str {
        "Retrieve documentation passages relevant to a classified query, \
         joined into one context block with source attributions."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "The classified category id"
                },
                "query": {
                    "type": "string",
                    "description": "The customer query to retrieve for"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum passages to retrieve (default 3)"
                }
            },
            "required": ["category", "query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let params: GetKnowledgeParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        if !self.registry.contains(&params.category) {
            return Err(StoreError::UnknownCategory(params.category).into());
        }

        let hits = self.index.search(&params.query, params.max_results.min(20))?;
        debug!(
            category = %params.category,
            hits = hits.len(),
            "knowledge retrieved"
        );
        Ok(serde_json::json!({
            "knowledge_text": knowledge_text(&hits),
            "sources": sources(&hits),
        }))
    }
}

/// Uncategorized search across the whole index.
pub struct SearchKnowledgeTool {
    index: Arc<KnowledgeIndex>,
}

impl SearchKnowledgeTool {
    pub fn new(index: Arc<KnowledgeIndex>) -> Self {
        Self { index }
    }
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default = "default_search_results")]
    max_results: usize,
}

#[async_trait]
impl Tool for SearchKnowledgeTool {
    fn name(&self) -> &str {
        "search_knowledge"
    }

    fn description(&self) -> &str {
        "Search the product documentation knowledge base. Returns matching \
         passages with source citations and similarity scores."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for in the knowledge base"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum matches to return (default 5)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let params: SearchParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let hits = self.index.search(&params.query, params.max_results.min(20))?;
        Ok(serde_json::json!({ "matches": hits }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::builtin_documents;

    fn built_index() -> Arc<KnowledgeIndex> {
        let mut index = KnowledgeIndex::new(60, 12);
        index.build(&builtin_documents()).unwrap();
        Arc::new(index)
    }

    fn registry() -> Arc<CategoryRegistry> {
        Arc::new(CategoryRegistry::builtin())
    }

    #[tokio::test]
    async fn get_knowledge_joins_passages_with_sources() {
        let tool = GetKnowledgeForQueryTool::new(registry(), built_index());
        let result = tool
            .execute(serde_json::json!({
                "category": "account_security",
                "query": "how do I reset my password",
                "max_results": 2
            }))
            .await
            .unwrap();

        let text = result["knowledge_text"].as_str().unwrap();
        assert!(text.contains("[Source: "));
        assert!(text.to_lowercase().contains("password"));

        let sources = result["sources"].as_array().unwrap();
        assert!(!sources.is_empty());
        assert!(sources.len() <= 2);
    }

    #[tokio::test]
    async fn get_knowledge_rejects_unknown_category() {
        let tool = GetKnowledgeForQueryTool::new(registry(), built_index());
        let err = tool
            .execute(serde_json::json!({
                "category": "billing",
                "query": "anything"
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Store(StoreError::UnknownCategory(_))));
    }

    #[tokio::test]
    async fn get_knowledge_fails_when_index_unbuilt() {
        let index = Arc::new(KnowledgeIndex::new(60, 12));
        let tool = GetKnowledgeForQueryTool::new(registry(), index);
        let err = tool
            .execute(serde_json::json!({
                "category": "account_security",
                "query": "reset"
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Knowledge(_)));
    }

    #[tokio::test]
    async fn search_returns_scored_matches() {
        let tool = SearchKnowledgeTool::new(built_index());
        let result = tool
            .execute(serde_json::json!({"query": "shipping time", "max_results": 3}))
            .await
            .unwrap();

        let matches = result["matches"].as_array().unwrap();
        assert!(!matches.is_empty());
        assert!(matches.len() <= 3);
        assert!(matches[0]["content"].is_string());
        assert!(matches[0]["source"].is_string());
        assert!(matches[0]["score"].is_number());
    }

    #[test]
    fn knowledge_text_formats_empty_and_joined() {
        assert_eq!(knowledge_text(&[]), "No relevant documentation found.");

        let hits = vec![
            SearchHit { content: "A".into(), source: "one.md".into(), score: 0.9 },
            SearchHit { content: "B".into(), source: "two.md".into(), score: 0.5 },
        ];
        let text = knowledge_text(&hits);
        assert!(text.starts_with("[Source: one.md]\nA"));
        assert!(text.contains("\n\n---\n\n"));
        assert!(text.contains("[Source: two.md]\nB"));
    }

    #[test]
    fn sources_deduplicate_in_order() {
        let hits = vec![
            SearchHit { content: "A".into(), source: "one.md".into(), score: 0.9 },
            SearchHit { content: "B".into(), source: "two.md".into(), score: 0.5 },
            SearchHit { content: "C".into(), source: "one.md".into(), score: 0.4 },
        ];
        assert_eq!(sources(&hits), vec!["one.md", "two.md"]);
    }
}
