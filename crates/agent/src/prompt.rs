//! Prompt assembly.
//!
//! Pure string work: fill the category template, optionally weave in
//! what we know about the customer, and pin the reply format the
//! structured-reply parser expects. Kept free of I/O so it can be
//! tested exhaustively.

use crabdesk_core::support::Customer;

/// Instructions appended to every prompt. The trailing "JSON Response:"
/// nudges completion models into starting the object immediately.
const REPLY_FORMAT: &str = "\n\nRespond with JSON containing:\n\
- \"response\": your answer (2-3 sentences)\n\
- \"action_needed\": \"none\", \"create_ticket\", or \"escalate\"\n\
- \"confidence\": 0-1\n\n\
JSON Response:";

/// Everything that goes into one prompt.
pub struct PromptInput<'a> {
    /// Category template with `{query}` / `{context}` placeholders.
    /// May be empty; a generic scaffold is used then.
    pub template: &'a str,
    pub query: &'a str,
    /// Concatenated knowledge passages.
    pub knowledge: &'a str,
    pub customer: Option<&'a Customer>,
}

impl PromptInput<'_> {
    pub fn assemble(&self) -> String {
        let mut prompt = if self.template.trim().is_empty() {
            format!(
                "Please help with this customer question: {}\n\n\
                 Based on this documentation:\n{}\n\n\
                 Provide a helpful response.",
                self.query, self.knowledge
            )
        } else {
            self.template
                .replace("{query}", self.query)
                .replace("{context}", self.knowledge)
        };

        if let Some(customer) = self.customer {
            prompt.push_str("\n\nCustomer on record:\n");
            prompt.push_str(&customer_block(customer));
        }

        prompt.push_str(REPLY_FORMAT);
        prompt
    }
}

fn customer_block(customer: &Customer) -> String {
    let orders = if customer.open_orders.is_empty() {
        "none".to_string()
    } else {
        customer.open_orders.join(", ")
    };
    format!(
        "Name: {} ({} tier)\nAccount: {}\nOpen orders: {}\nPrevious tickets: {}",
        customer.name, customer.tier, customer.account_id, orders, customer.ticket_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            email: "sarah@example.com".to_string(),
            name: "Sarah Chen".to_string(),
            tier: "premium".to_string(),
            account_id: "ACCT-1001".to_string(),
            open_orders: vec!["ORD-2001".to_string(), "ORD-2002".to_string()],
            ticket_count: 2,
        }
    }

    #[test]
    fn fills_template_placeholders() {
        let input = PromptInput {
            template: "Q: {query}\nDocs: {context}",
            query: "reset my password",
            knowledge: "Visit the login page.",
            customer: None,
        };
        let prompt = input.assemble();
        assert!(prompt.starts_with("Q: reset my password\nDocs: Visit the login page."));
        assert!(!prompt.contains("{query}"));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn empty_template_uses_generic_scaffold() {
        let input = PromptInput {
            template: "  ",
            query: "where is my order",
            knowledge: "Orders ship in 2 days.",
            customer: None,
        };
        let prompt = input.assemble();
        assert!(prompt.contains("Please help with this customer question: where is my order"));
        assert!(prompt.contains("Orders ship in 2 days."));
    }

    #[test]
    fn customer_block_lists_orders_and_history() {
        let customer = customer();
        let input = PromptInput {
            template: "{query} {context}",
            query: "q",
            knowledge: "k",
            customer: Some(&customer),
        };
        let prompt = input.assemble();
        assert!(prompt.contains("Customer on record:"));
        assert!(prompt.contains("Sarah Chen (premium tier)"));
        assert!(prompt.contains("Open orders: ORD-2001, ORD-2002"));
        assert!(prompt.contains("Previous tickets: 2"));
    }

    #[test]
    fn no_customer_means_no_block() {
        let input = PromptInput {
            template: "{query} {context}",
            query: "q",
            knowledge: "k",
            customer: None,
        };
        assert!(!input.assemble().contains("Customer on record:"));
    }

    #[test]
    fn customer_without_orders_reads_none() {
        let mut customer = customer();
        customer.open_orders.clear();
        let input = PromptInput {
            template: "",
            query: "q",
            knowledge: "k",
            customer: Some(&customer),
        };
        assert!(input.assemble().contains("Open orders: none"));
    }

    #[test]
    fn every_prompt_ends_with_the_reply_format() {
        let input = PromptInput {
            template: "{query}",
            query: "q",
            knowledge: "",
            customer: None,
        };
        let prompt = input.assemble();
        assert!(prompt.ends_with("JSON Response:"));
        assert!(prompt.contains("\"action_needed\": \"none\", \"create_ticket\", or \"escalate\""));
    }
}
