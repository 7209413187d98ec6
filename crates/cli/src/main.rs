//! crabdesk CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize configuration
//! - `chat`    — Interactive chat or single-message support mode
//! - `host`    — Run the tool host on stdio (spawned by `chat`)

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "crabdesk",
    about = "crabdesk — customer support agent over a stdio tool host",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Chat with the support agent
    Chat {
        /// Send a single question instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Customer email, for personalized support and tickets
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Run the tool host on stdio
    Host {
        /// Load knowledge documents from this directory
        #[arg(long)]
        docs_dir: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing. Logs go to stderr: in host mode stdout
    // carries the wire protocol, in chat mode it is the conversation.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { message, email } => commands::chat::run(message, email).await?,
        Commands::Host { docs_dir } => commands::host::run(docs_dir).await?,
    }

    Ok(())
}
