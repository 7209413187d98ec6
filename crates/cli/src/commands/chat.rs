//! `crabdesk chat` — Interactive or single-message support chat.
//!
//! Spawns `crabdesk host` as a subprocess and drives the support
//! workflow against it. Works without an API key: answers then degrade
//! to knowledge-base excerpts instead of model completions.

use std::sync::Arc;

use crabdesk_agent::{AgentOptions, AgentResponse, HostClient, SupportAgent, Workflow};
use crabdesk_config::AppConfig;
use crabdesk_inference::HttpInferenceClient;

/// Sample queries behind the `demo` command in interactive mode.
const DEMO_QUERIES: [&str; 4] = [
    "How do I reset my password?",
    "My device won't turn on",
    "What is your return policy?",
    "Tell me about OmniTech",
];

pub async fn run(
    message: Option<String>,
    email: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Missing key is a warning, not an error: the agent still answers
    // from the knowledge base, flagged as degraded.
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  WARNING: No API key configured.");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    HF_TOKEN           (Hugging Face token, recommended)");
        eprintln!("    CRABDESK_API_KEY   (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Get a token at: https://huggingface.co/settings/tokens");
        eprintln!();
        eprintln!("  Continuing with knowledge-base answers only.");
        eprintln!();
    }

    // The tool host is this same binary in `host` mode.
    let exe = std::env::current_exe()?;
    let client = HostClient::spawn(
        &exe,
        ["host"],
        config.host.startup_timeout(),
        config.host.request_timeout(),
    )?;

    let inference = Arc::new(HttpInferenceClient::new(
        "huggingface",
        &config.inference.endpoint,
        config.inference.api_key.clone().unwrap_or_default(),
        &config.inference.model,
        config.inference.timeout(),
    ));

    let options = AgentOptions {
        support_threshold: config.agent.support_threshold,
        top_k: config.agent.top_k,
        temperature: config.inference.temperature,
        max_tokens: config.inference.max_tokens,
    };
    let agent = SupportAgent::new(client, inference, options);

    // Fail fast if the host never comes up.
    let info = agent.connect().await?;

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let result = agent.process_query(&msg, email.as_deref()).await;
        eprint!("\r             \r");
        match result {
            Ok(response) => print_response(&response),
            Err(e) => {
                agent.shutdown().await;
                return Err(e.into());
            }
        }
        agent.shutdown().await;
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║      crabdesk — OmniTech Support Agent       ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!(
        "  Host:      {} v{} ({} tools)",
        info.server, info.version, info.tool_count
    );
    println!("  Model:     {}", config.inference.model);
    if let Some(email) = &email {
        println!("  Customer:  {email}");
    }
    println!();
    println!("  Type your question and press Enter.");
    println!("  Commands: 'demo' for sample queries, 'stats' for session");
    println!("  metrics, 'exit' or Ctrl+C to quit.");
    println!();

    use tokio::io::AsyncBufReadExt;
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    print_prompt()?;
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "exit" | "quit" => break,
            "demo" => {
                for query in DEMO_QUERIES {
                    println!();
                    println!("  You > {query}");
                    answer(&agent, query, email.as_deref()).await;
                }
            }
            "stats" => print_session_stats(&agent),
            query => answer(&agent, query, email.as_deref()).await,
        }
        print_prompt()?;
    }

    print_session_stats(&agent);
    agent.shutdown().await;
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

async fn answer(agent: &SupportAgent, query: &str, email: Option<&str>) {
    eprint!("  ...");
    match agent.process_query(query, email).await {
        Ok(response) => {
            eprint!("\r     \r");
            print_response(&response);
        }
        Err(e) => {
            eprint!("\r     \r");
            eprintln!("  [Error] {e}");
            println!();
        }
    }
}

fn print_response(response: &AgentResponse) {
    println!();
    for line in response.answer.lines() {
        println!("  Assistant > {line}");
    }
    println!();

    let workflow = match response.workflow {
        Workflow::Support => "support",
        Workflow::Exploratory => "exploratory",
    };
    println!(
        "  [{} | confidence {:.2} | {} | {} source(s)]",
        response.category,
        response.confidence,
        workflow,
        response.sources.len()
    );
    if let Some(ticket) = &response.ticket {
        println!("  [Ticket #{} filed under {}]", ticket.id, ticket.category);
    }
    if response.degraded {
        println!("  [Offline answer: inference backend unreachable]");
    }
    println!();
}

fn print_session_stats(agent: &SupportAgent) {
    let snap = agent.metrics();
    println!();
    println!(
        "  Session: {} queries, {} resolved, {} tickets",
        snap.total_queries, snap.resolved_queries, snap.tickets_created
    );
    println!();
}

fn print_prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("  You > ");
    std::io::stdout().flush()
}
