//! # crabdesk Agent
//!
//! The orchestration side of crabdesk: owns the connection to a tool
//! host, walks each customer query through the four-step workflow
//! (classify, template, knowledge, respond), and turns the model's
//! structured reply into an answer plus optional side effects.
//!
//! The agent holds no domain state of its own. Everything it knows
//! about categories, customers, and documents arrives through tool
//! calls; everything it says comes from the inference backend, with a
//! knowledge-excerpt fallback when that backend is down.

pub mod client;
pub mod metrics;
pub mod prompt;

pub use client::HostClient;
pub use metrics::{AgentMetrics, MetricsSnapshot};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crabdesk_core::error::{AgentError, ClientError};
use crabdesk_core::wire::InitializeResult;
use crabdesk_core::{
    ClassificationResult, Customer, ErrorCode, InferenceClient, InferenceRequest, RoutePreference,
    Ticket,
};
use crabdesk_inference::{ReplyAction, parse_reply};

use prompt::PromptInput;

/// Characters of knowledge text quoted verbatim when inference is down.
const DEGRADED_EXCERPT_CHARS: usize = 400;

/// Workflow tuning knobs. Everything has a sensible default; the CLI
/// overrides them from configuration.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Classification confidence below this routes exploratory.
    pub support_threshold: f32,
    /// Knowledge passages requested per query.
    pub top_k: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            support_threshold: 0.1,
            top_k: 3,
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// Which path a query took through the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    /// Full path: customer lookup, inference, possible ticket.
    Support,
    /// Knowledge-only path: customer and ticket tools are never touched.
    Exploratory,
}

/// The answer to one query, with everything gathered along the way.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    pub answer: String,
    pub category: String,
    pub confidence: f32,
    /// Document titles the knowledge passages came from.
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_context: Option<Customer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
    /// True when the answer is a knowledge excerpt because inference
    /// was unavailable.
    pub degraded: bool,
    pub workflow: Workflow,
    /// Human-readable trace of the steps taken.
    pub workflow_log: Vec<String>,
}

/// The routing rule: a query leaves the support path when the
/// classifier was not confident enough, or when the winning category
/// prefers knowledge-only answers.
pub fn routes_exploratory(confidence: f32, route: RoutePreference, threshold: f32) -> bool {
    confidence < threshold || route == RoutePreference::Knowledge
}

/// Drives the support workflow against one tool host and one inference
/// backend.
pub struct SupportAgent {
    client: HostClient,
    inference: Arc<dyn InferenceClient>,
    options: AgentOptions,
    metrics: AgentMetrics,
}

impl SupportAgent {
    pub fn new(
        client: HostClient,
        inference: Arc<dyn InferenceClient>,
        options: AgentOptions,
    ) -> Self {
        Self {
            client,
            inference,
            options,
            metrics: AgentMetrics::new(),
        }
    }

    /// Make sure the host answered its handshake. Optional; the first
    /// query performs it anyway. Useful for failing fast at startup and
    /// for banner output.
    pub async fn connect(&self) -> Result<InitializeResult, AgentError> {
        self.client.ensure_ready().await.map_err(connect_error)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub async fn shutdown(&self) {
        self.client.shutdown().await;
    }

    /// Answer one customer query.
    ///
    /// Errors surface only when the host itself is unusable; an
    /// unreachable inference backend degrades to a knowledge excerpt
    /// instead of failing the query.
    pub async fn process_query(
        &self,
        query: &str,
        customer_email: Option<&str>,
    ) -> Result<AgentResponse, AgentError> {
        self.metrics.record_query();
        self.client.ensure_ready().await.map_err(connect_error)?;

        let mut log = Vec::new();

        log.push("[1/4] Classifying query...".to_string());
        let value = self
            .call_tool("classify_query", json!({ "query": query }))
            .await?;
        let classified: ClassificationResult = serde_json::from_value(value).map_err(|e| {
            AgentError::BackendUnavailable(format!("malformed classification result: {e}"))
        })?;
        log.push(format!(
            "[INFO] Category: {} (confidence {:.2})",
            classified.category, classified.confidence
        ));

        log.push("[2/4] Fetching category template...".to_string());
        let value = self
            .call_tool(
                "get_query_template",
                json!({ "category": classified.category }),
            )
            .await?;
        let template = value["template"].as_str().unwrap_or_default().to_string();
        let description = value["description"]
            .as_str()
            .unwrap_or(&classified.category)
            .to_string();

        log.push("[3/4] Retrieving knowledge...".to_string());
        let value = self
            .call_tool(
                "get_knowledge_for_query",
                json!({
                    "category": classified.category,
                    "query": query,
                    "max_results": self.options.top_k,
                }),
            )
            .await?;
        let knowledge = value["knowledge_text"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let sources: Vec<String> =
            serde_json::from_value(value["sources"].clone()).unwrap_or_default();
        log.push(format!("[INFO] Retrieved {} source(s)", sources.len()));

        let exploratory = routes_exploratory(
            classified.confidence,
            classified.route,
            self.options.support_threshold,
        );
        let workflow = if exploratory {
            Workflow::Exploratory
        } else {
            Workflow::Support
        };

        let mut customer = None;
        if exploratory {
            log.push("[INFO] Exploratory workflow: answering from the knowledge base".to_string());
        } else if let Some(email) = customer_email {
            match self.call_tool("lookup_customer", json!({ "email": email })).await {
                Ok(value) => {
                    let found: Customer = serde_json::from_value(value).map_err(|e| {
                        AgentError::BackendUnavailable(format!("malformed customer record: {e}"))
                    })?;
                    log.push(format!("[INFO] Customer: {} ({} tier)", found.name, found.tier));
                    customer = Some(found);
                }
                Err(AgentError::ToolFailed { code: ErrorCode::NotFound, .. }) => {
                    log.push(format!("[INFO] No customer record for {email}"));
                }
                Err(e) => return Err(e),
            }
        }

        log.push("[4/4] Generating response...".to_string());
        let prompt = PromptInput {
            template: &template,
            query,
            knowledge: &knowledge,
            customer: customer.as_ref(),
        }
        .assemble();
        let mut request = InferenceRequest::new(prompt);
        request.temperature = self.options.temperature;
        request.max_tokens = self.options.max_tokens;

        match self.inference.complete(request).await {
            Ok(reply) => {
                if !reply.text.trim().is_empty() {
                    self.metrics.record_resolved();
                }
                let parsed = parse_reply(&reply.text);
                log.push("[SUCCESS] Response generated".to_string());
                info!(
                    category = %classified.category,
                    workflow = ?workflow,
                    model = %reply.model,
                    "query answered"
                );

                let mut ticket = None;
                if !exploratory && parsed.action_needed == ReplyAction::CreateTicket {
                    let filed = self
                        .file_ticket(customer_email, &classified.category, query)
                        .await?;
                    log.push(format!("[INFO] Created ticket #{}", filed.id));
                    self.metrics.record_ticket();
                    ticket = Some(filed);
                }

                Ok(AgentResponse {
                    answer: parsed.response,
                    category: classified.category,
                    confidence: classified.confidence,
                    sources,
                    customer_context: customer,
                    ticket,
                    degraded: false,
                    workflow,
                    workflow_log: log,
                })
            }
            Err(e) => {
                warn!(error = %e, "inference unavailable, answering from knowledge excerpt");
                log.push(format!("[WARN] Inference unavailable: {e}"));
                Ok(AgentResponse {
                    answer: degraded_answer(&description, &knowledge),
                    category: classified.category,
                    confidence: classified.confidence,
                    sources,
                    customer_context: customer,
                    ticket: None,
                    degraded: true,
                    workflow,
                    workflow_log: log,
                })
            }
        }
    }

    async fn call_tool(
        &self,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, AgentError> {
        self.client.call_tool(tool, arguments).await.map_err(|e| match e {
            ClientError::Wire { code, message } => AgentError::ToolFailed {
                tool: tool.to_string(),
                code,
                message,
            },
            ClientError::StartupTimeout { timeout_secs } => {
                AgentError::StartupTimeout { timeout_secs }
            }
            other => AgentError::BackendUnavailable(other.to_string()),
        })
    }

    /// `customer_email` is omitted from the arguments entirely when
    /// absent; the host schema rejects explicit nulls.
    async fn file_ticket(
        &self,
        customer_email: Option<&str>,
        category: &str,
        query: &str,
    ) -> Result<Ticket, AgentError> {
        let mut args = serde_json::Map::new();
        if let Some(email) = customer_email {
            args.insert("customer_email".into(), json!(email));
        }
        args.insert("category".into(), json!(category));
        args.insert("query".into(), json!(query));

        let value = self
            .call_tool("create_ticket", serde_json::Value::Object(args))
            .await?;
        serde_json::from_value(value)
            .map_err(|e| AgentError::BackendUnavailable(format!("malformed ticket: {e}")))
    }
}

fn connect_error(e: ClientError) -> AgentError {
    match e {
        ClientError::StartupTimeout { timeout_secs } => AgentError::StartupTimeout { timeout_secs },
        other => AgentError::BackendUnavailable(other.to_string()),
    }
}

fn degraded_answer(description: &str, knowledge: &str) -> String {
    let excerpt: String = knowledge.chars().take(DEGRADED_EXCERPT_CHARS).collect();
    format!("Based on our {description}:\n\n{excerpt}...")
}
