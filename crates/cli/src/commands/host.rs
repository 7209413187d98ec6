//! `crabdesk host` — Run the tool host on stdio.
//!
//! Normally spawned as a subprocess by `crabdesk chat`, but running it
//! by hand works too: it speaks newline-delimited JSON on stdin/stdout
//! until a `shutdown` request or EOF.

use std::path::PathBuf;
use std::sync::Arc;

use crabdesk_config::AppConfig;
use crabdesk_host::{HostOptions, build_host, serve_stdio};

pub async fn run(docs_dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let options = HostOptions {
        keyword_weight: config.classifier.keyword_weight,
        example_weight: config.classifier.example_weight,
        chunk_size: config.knowledge.chunk_size,
        chunk_overlap: config.knowledge.chunk_overlap,
        // The flag wins over the config file.
        docs_dir: docs_dir.or(config.knowledge.docs_dir),
    };

    let host = Arc::new(build_host(&options)?);
    tracing::info!("tool host listening on stdio");
    serve_stdio(host).await?;
    tracing::info!("tool host stopped");

    Ok(())
}
