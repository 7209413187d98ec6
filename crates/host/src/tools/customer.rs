//! Customer tool: `lookup_customer`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crabdesk_core::error::ToolError;
use crabdesk_core::tool::Tool;
use crabdesk_store::SupportStore;

pub struct LookupCustomerTool {
    store: Arc<SupportStore>,
}

impl LookupCustomerTool {
    pub fn new(store: Arc<SupportStore>) -> Self {
        Self { store }
    }
}

#[derive(Deserialize)]
struct LookupParams {
    email: String,
}

#[async_trait]
impl Tool for LookupCustomerTool {
    fn name(&self) -> &str {
        "lookup_customer"
    }

    fn description(&self) -> &str {
        "Look up a customer record by email: name, tier, account id, open \
         orders, and ticket count."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "email": {
                    "type": "string",
                    "description": "The customer's email address"
                }
            },
            "required": ["email"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let params: LookupParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        let customer = self.store.lookup_customer(&params.email).await?;
        serde_json::to_value(customer).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().to_string(),
            reason: e.to_string(),
        })
    }
}
