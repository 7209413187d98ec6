//! In-memory customer and ticket store.
//!
//! Customers are keyed by email and never deleted during a session.
//! Tickets live in an append-only log with strictly increasing ids. One
//! lock guards both, so a ticket append and its customer counter bump
//! commit together or not at all.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use crabdesk_core::category::CategoryRegistry;
use crabdesk_core::error::StoreError;
use crabdesk_core::support::{CategoryCount, Customer, StoreStats, Ticket, TicketStatus};

struct StoreInner {
    customers: HashMap<String, Customer>,
    tickets: Vec<Ticket>,
    next_ticket_id: u64,
}

/// The store. Cheap to share behind an `Arc`; all methods take `&self`.
pub struct SupportStore {
    registry: Arc<CategoryRegistry>,
    inner: RwLock<StoreInner>,
}

impl SupportStore {
    pub fn new(registry: Arc<CategoryRegistry>) -> Self {
        Self {
            registry,
            inner: RwLock::new(StoreInner {
                customers: HashMap::new(),
                tickets: Vec::new(),
                next_ticket_id: 1,
            }),
        }
    }

    /// A store pre-seeded with a few demo customers, used by the CLI.
    pub fn with_demo_data(registry: Arc<CategoryRegistry>) -> Self {
        let customers = demo_customers()
            .into_iter()
            .map(|c| (c.email.clone(), c))
            .collect();
        Self {
            registry,
            inner: RwLock::new(StoreInner {
                customers,
                tickets: Vec::new(),
                next_ticket_id: 1,
            }),
        }
    }

    /// Insert or replace a customer record.
    pub async fn add_customer(&self, customer: Customer) {
        let mut inner = self.inner.write().await;
        inner.customers.insert(customer.email.clone(), customer);
    }

    /// Look up a customer by exact email.
    pub async fn lookup_customer(&self, email: &str) -> Result<Customer, StoreError> {
        let inner = self.inner.read().await;
        inner
            .customers
            .get(email)
            .cloned()
            .ok_or_else(|| StoreError::CustomerNotFound(email.to_string()))
    }

    /// Create a ticket.
    ///
    /// The category is validated before anything is touched. The ticket
    /// append and the known-customer counter bump happen under one write
    /// lock; an email that matches no customer is recorded on the ticket
    /// without moving any counter.
    pub async fn create_ticket(
        &self,
        customer_email: Option<&str>,
        category_id: &str,
        query: &str,
    ) -> Result<Ticket, StoreError> {
        if !self.registry.contains(category_id) {
            return Err(StoreError::UnknownCategory(category_id.to_string()));
        }

        let mut inner = self.inner.write().await;
        let id = inner.next_ticket_id;
        inner.next_ticket_id += 1;

        let ticket = Ticket {
            id,
            customer_email: customer_email.map(str::to_string),
            category: category_id.to_string(),
            query: query.to_string(),
            created_at: Utc::now(),
            status: TicketStatus::Open,
        };

        if let Some(email) = customer_email {
            if let Some(customer) = inner.customers.get_mut(email) {
                customer.ticket_count += 1;
            }
        }
        inner.tickets.push(ticket.clone());

        info!(
            ticket_id = ticket.id,
            category = %ticket.category,
            "ticket created"
        );
        Ok(ticket)
    }

    /// Tickets from the log, optionally filtered, in creation order.
    pub async fn list_tickets(
        &self,
        customer_email: Option<&str>,
        status: Option<TicketStatus>,
        limit: usize,
    ) -> Vec<Ticket> {
        let inner = self.inner.read().await;
        inner
            .tickets
            .iter()
            .filter(|t| match customer_email {
                Some(email) => t.customer_email.as_deref() == Some(email),
                None => true,
            })
            .filter(|t| match status {
                Some(s) => t.status == s,
                None => true,
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// Snapshot computed from the log. Per-category counts follow
    /// registry order and include zero-ticket categories.
    pub async fn stats(&self) -> StoreStats {
        let inner = self.inner.read().await;
        let tickets_by_category = self
            .registry
            .list()
            .iter()
            .map(|cat| CategoryCount {
                category: cat.id.clone(),
                count: inner.tickets.iter().filter(|t| t.category == cat.id).count() as u64,
            })
            .collect();

        StoreStats {
            tickets_total: inner.tickets.len() as u64,
            tickets_open: inner
                .tickets
                .iter()
                .filter(|t| t.status == TicketStatus::Open)
                .count() as u64,
            tickets_by_category,
            customers: inner.customers.len() as u64,
        }
    }
}

/// The demo customer seed.
fn demo_customers() -> Vec<Customer> {
    vec![
        Customer {
            email: "sarah.chen@example.com".into(),
            name: "Sarah Chen".into(),
            tier: "premium".into(),
            account_id: "ACCT-10231".into(),
            open_orders: vec!["ORD-88112".into()],
            ticket_count: 0,
        },
        Customer {
            email: "marcus.webb@example.com".into(),
            name: "Marcus Webb".into(),
            tier: "standard".into(),
            account_id: "ACCT-10488".into(),
            open_orders: vec![],
            ticket_count: 0,
        },
        Customer {
            email: "priya.patel@example.com".into(),
            name: "Priya Patel".into(),
            tier: "premium".into(),
            account_id: "ACCT-10542".into(),
            open_orders: vec!["ORD-88340".into(), "ORD-88417".into()],
            ticket_count: 0,
        },
    ]
}
