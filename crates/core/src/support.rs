//! Customer and ticket records, plus the derived stats reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer account, keyed by unique email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique key
    pub email: String,

    pub name: String,

    /// Support tier, e.g. "standard" or "premium"
    pub tier: String,

    pub account_id: String,

    /// Order ids currently in flight (ordered)
    #[serde(default)]
    pub open_orders: Vec<String>,

    /// Number of tickets in the log referencing this email
    #[serde(default)]
    pub ticket_count: u64,
}

/// Ticket lifecycle: `Open` on creation, `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    Closed,
}

/// A support ticket. Appended to an ordered log, never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Strictly increasing, never reused
    pub id: u64,

    /// Anonymous tickets carry no email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    /// Always references a registered category
    pub category: String,

    /// The query that raised the ticket
    pub query: String,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub status: TicketStatus,
}

/// Ticket count for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Store-level snapshot, computed on demand from the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub tickets_total: u64,
    pub tickets_open: u64,
    /// Registry order, categories with zero tickets included
    pub tickets_by_category: Vec<CategoryCount>,
    pub customers: u64,
}

/// Host-level snapshot returned by `get_server_stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStats {
    /// Tool dispatches since startup
    pub tool_calls: u64,

    /// Failed dispatches since startup
    pub tool_errors: u64,

    pub tickets_created: u64,
    pub tickets_open: u64,
    pub tickets_by_category: Vec<CategoryCount>,
    pub customers: u64,
    pub knowledge_documents: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_serialization_omits_missing_email() {
        let ticket = Ticket {
            id: 1,
            customer_email: None,
            category: "returns_refunds".into(),
            query: "refund please".into(),
            created_at: Utc::now(),
            status: TicketStatus::Open,
        };
        let json = serde_json::to_string(&ticket).unwrap();
        assert!(!json.contains("customer_email"));
        assert!(json.contains("\"status\":\"open\""));
    }

    #[test]
    fn ticket_status_defaults_to_open() {
        let json = r#"{"id":7,"category":"shipping_inquiry","query":"where","created_at":"2025-01-01T00:00:00Z"}"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.customer_email.is_none());
    }
}
