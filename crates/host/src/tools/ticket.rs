//! Ticket tools: `create_ticket` and `get_tickets`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crabdesk_core::error::ToolError;
use crabdesk_core::support::TicketStatus;
use crabdesk_core::tool::Tool;
use crabdesk_store::SupportStore;

fn default_limit() -> usize {
    50
}

pub struct CreateTicketTool {
    store: Arc<SupportStore>,
}

impl CreateTicketTool {
    pub fn new(store: Arc<SupportStore>) -> Self {
        Self { store }
    }
}

#[derive(Deserialize)]
struct CreateTicketParams {
    #[serde(default)]
    customer_email: Option<String>,
    category: String,
    query: String,
}

#[async_trait]
impl Tool for CreateTicketTool {
    fn name(&self) -> &str {
        "create_ticket"
    }

    fn description(&self) -> &str {
        "Create a support ticket for a query. The email is optional; known \
         customers get their ticket count updated."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "customer_email": {
                    "type": "string",
                    "description": "The customer's email, omitted for anonymous tickets"
                },
                "category": {
                    "type": "string",
                    "description": "A registered category id"
                },
                "query": {
                    "type": "string",
                    "description": "The query the ticket is about"
                }
            },
            "required": ["category", "query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let params: CreateTicketParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let ticket = self
            .store
            .create_ticket(params.customer_email.as_deref(), &params.category, &params.query)
            .await?;
        serde_json::to_value(ticket).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().to_string(),
            reason: e.to_string(),
        })
    }
}

pub struct GetTicketsTool {
    store: Arc<SupportStore>,
}

impl GetTicketsTool {
    pub fn new(store: Arc<SupportStore>) -> Self {
        Self { store }
    }
}

#[derive(Deserialize)]
struct GetTicketsParams {
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

#[async_trait]
impl Tool for GetTicketsTool {
    fn name(&self) -> &str {
        "get_tickets"
    }

    fn description(&self) -> &str {
        "List support tickets, optionally filtered by customer email and \
         status ('open' or 'closed')."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "customer_email": {
                    "type": "string",
                    "description": "Only tickets for this email"
                },
                "status": {
                    "type": "string",
                    "description": "Only tickets with this status: 'open' or 'closed'"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum tickets to return (default 50)"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let params: GetTicketsParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let status = match params.status.as_deref() {
            None => None,
            Some("open") => Some(TicketStatus::Open),
            Some("closed") => Some(TicketStatus::Closed),
            Some(other) => {
                return Err(ToolError::InvalidArguments(format!(
                    "status must be 'open' or 'closed', got '{other}'"
                )));
            }
        };

        let tickets = self
            .store
            .list_tickets(params.customer_email.as_deref(), status, params.limit)
            .await;
        Ok(serde_json::json!({ "tickets": tickets }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crabdesk_core::category::CategoryRegistry;
    use crabdesk_core::error::StoreError;

    fn demo_store() -> Arc<SupportStore> {
        Arc::new(SupportStore::with_demo_data(Arc::new(CategoryRegistry::builtin())))
    }

    #[tokio::test]
    async fn create_ticket_returns_record_with_id() {
        let tool = CreateTicketTool::new(demo_store());
        let result = tool
            .execute(serde_json::json!({
                "customer_email": "sarah.chen@example.com",
                "category": "device_troubleshooting",
                "query": "my hub won't turn on"
            }))
            .await
            .unwrap();
        assert_eq!(result["id"], 1);
        assert_eq!(result["status"], "open");
        assert_eq!(result["customer_email"], "sarah.chen@example.com");
    }

    #[tokio::test]
    async fn create_ticket_unknown_category_fails() {
        let tool = CreateTicketTool::new(demo_store());
        let err = tool
            .execute(serde_json::json!({
                "category": "billing",
                "query": "overcharged"
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Store(StoreError::UnknownCategory(_))));
    }

    #[tokio::test]
    async fn get_tickets_filters_by_status_string() {
        let store = demo_store();
        let create = CreateTicketTool::new(Arc::clone(&store));
        create
            .execute(serde_json::json!({
                "category": "shipping_inquiry",
                "query": "where is my order"
            }))
            .await
            .unwrap();

        let tool = GetTicketsTool::new(store);
        let open = tool
            .execute(serde_json::json!({"status": "open"}))
            .await
            .unwrap();
        assert_eq!(open["tickets"].as_array().unwrap().len(), 1);

        let closed = tool
            .execute(serde_json::json!({"status": "closed"}))
            .await
            .unwrap();
        assert!(closed["tickets"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_tickets_rejects_bad_status() {
        let tool = GetTicketsTool::new(demo_store());
        let err = tool
            .execute(serde_json::json!({"status": "pending"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn get_tickets_with_no_filters_lists_everything() {
        let store = demo_store();
        let create = CreateTicketTool::new(Arc::clone(&store));
        for i in 0..3 {
            create
                .execute(serde_json::json!({
                    "category": "general_support",
                    "query": format!("q{i}")
                }))
                .await
                .unwrap();
        }

        let tool = GetTicketsTool::new(store);
        let all = tool.execute(serde_json::json!({})).await.unwrap();
        assert_eq!(all["tickets"].as_array().unwrap().len(), 3);
    }
}
