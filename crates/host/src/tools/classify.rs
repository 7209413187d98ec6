//! Classification tools: `classify_query` and `get_query_template`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crabdesk_classifier::Classifier;
use crabdesk_core::category::CategoryRegistry;
use crabdesk_core::error::{StoreError, ToolError};
use crabdesk_core::tool::Tool;

/// Classifies a query against the category registry.
pub struct ClassifyQueryTool {
    classifier: Arc<Classifier>,
}

impl ClassifyQueryTool {
    pub fn new(classifier: Arc<Classifier>) -> Self {
        Self { classifier }
    }
}

#[derive(Deserialize)]
struct ClassifyParams {
    query: String,
}

#[async_trait]
impl Tool for ClassifyQueryTool {
    fn name(&self) -> &str {
        "classify_query"
    }

    fn description(&self) -> &str {
        "Classify a customer support query into a category and report the \
         confidence and routing hint."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The customer query to classify"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let params: ClassifyParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let result = self.classifier.classify(&params.query);
        serde_json::to_value(result).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Returns the prompt template and description for a category.
pub struct GetQueryTemplateTool {
    registry: Arc<CategoryRegistry>,
}

impl GetQueryTemplateTool {
    pub fn new(registry: Arc<CategoryRegistry>) -> Self {
        Self { registry }
    }
}

#[derive(Deserialize)]
struct TemplateParams {
    category: String,
}

#[async_trait]
impl Tool for GetQueryTemplateTool {
    fn name(&self) -> &str {
        "get_query_template"
    }

    fn description(&self) -> &str {
        "Get the prompt template and description for a support category."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "A registered category id"
                }
            },
            "required": ["category"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let params: TemplateParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let category = self
            .registry
            .get(&params.category)
            .ok_or_else(|| StoreError::UnknownCategory(params.category.clone()))?;
        Ok(serde_json::json!({
            "template": category.prompt_template,
            "description": category.description,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<CategoryRegistry> {
        Arc::new(CategoryRegistry::builtin())
    }

    #[tokio::test]
    async fn classify_tool_reports_category_and_confidence() {
        let tool = ClassifyQueryTool::new(Arc::new(Classifier::new(registry(), 1.0, 1.0)));
        let result = tool
            .execute(serde_json::json!({"query": "How do I reset my password?"}))
            .await
            .unwrap();
        assert_eq!(result["category"], "account_security");
        assert!(result["confidence"].as_f64().unwrap() > 0.0);
        assert_eq!(result["route"], "support");
        assert_eq!(result["scores"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn classify_tool_rejects_missing_query() {
        let tool = ClassifyQueryTool::new(Arc::new(Classifier::new(registry(), 1.0, 1.0)));
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn template_tool_returns_template_with_placeholders() {
        let tool = GetQueryTemplateTool::new(registry());
        let result = tool
            .execute(serde_json::json!({"category": "returns_refunds"}))
            .await
            .unwrap();
        let template = result["template"].as_str().unwrap();
        assert!(template.contains("{query}"));
        assert!(template.contains("{context}"));
        assert!(result["description"].as_str().unwrap().contains("Returns"));
    }

    #[tokio::test]
    async fn template_tool_fails_for_unknown_category() {
        let tool = GetQueryTemplateTool::new(registry());
        let err = tool
            .execute(serde_json::json!({"category": "billing"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::Store(StoreError::UnknownCategory(c)) if c == "billing"
        ));
    }
}
