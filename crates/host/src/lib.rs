//! The tool protocol host.
//!
//! Owns the classifier, knowledge index, and support store, exposes
//! them as schema-described tools, and serves them over newline-
//! delimited JSON. [`build_host`] wires the whole thing up; the serve
//! loop in [`serve`] does the talking.

pub mod corpus;
pub mod dispatch;
pub mod metrics;
pub mod schema;
pub mod serve;
pub mod tools;

pub use dispatch::{HostState, ToolHost};
pub use metrics::HostMetrics;
pub use serve::{serve, serve_stdio};
pub use tools::default_registry;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use crabdesk_classifier::Classifier;
use crabdesk_core::Result;
use crabdesk_core::category::CategoryRegistry;
use crabdesk_knowledge::KnowledgeIndex;
use crabdesk_store::SupportStore;

/// Name reported in the `initialize` handshake.
pub const SERVER_NAME: &str = "crabdesk-host";

/// Tunables for a host instance. Everything has a working default so
/// `HostOptions::default()` yields a complete demo host.
#[derive(Debug, Clone)]
pub struct HostOptions {
    pub keyword_weight: f32,
    pub example_weight: f32,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Directory of `.md`/`.txt` documents to index; the built-in
    /// product documentation set when absent.
    pub docs_dir: Option<PathBuf>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            keyword_weight: 1.0,
            example_weight: 1.0,
            chunk_size: 80,
            chunk_overlap: 16,
            docs_dir: None,
        }
    }
}

/// Construct a ready host: built-in categories, indexed corpus, demo
/// customer store, and the full tool catalog.
pub fn build_host(options: &HostOptions) -> Result<ToolHost> {
    let categories = Arc::new(CategoryRegistry::builtin());
    let classifier = Arc::new(Classifier::new(
        categories.clone(),
        options.keyword_weight,
        options.example_weight,
    ));

    let documents = match &options.docs_dir {
        Some(dir) => match corpus::load_documents(dir) {
            Ok(docs) if !docs.is_empty() => docs,
            Ok(_) => {
                warn!(dir = %dir.display(), "no documents found, using built-in corpus");
                corpus::builtin_documents()
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "corpus unreadable, using built-in corpus");
                corpus::builtin_documents()
            }
        },
        None => corpus::builtin_documents(),
    };

    let mut index = KnowledgeIndex::new(options.chunk_size, options.chunk_overlap);
    index.build(&documents)?;

    let store = Arc::new(SupportStore::with_demo_data(categories.clone()));
    let metrics = Arc::new(HostMetrics::new());
    let registry = tools::default_registry(
        categories,
        classifier,
        Arc::new(index),
        store,
        metrics.clone(),
    );

    let mut host = ToolHost::new(SERVER_NAME, metrics);
    host.install(registry);
    Ok(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_options_build_a_ready_host() {
        let host = build_host(&HostOptions::default()).unwrap();
        assert_eq!(host.state(), HostState::Ready);
    }

    #[test]
    fn docs_dir_overrides_the_builtin_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("faq.md")).unwrap();
        writeln!(
            f,
            "Frequently asked questions about widget calibration and setup."
        )
        .unwrap();

        let host = build_host(&HostOptions {
            docs_dir: Some(dir.path().to_path_buf()),
            ..HostOptions::default()
        })
        .unwrap();
        assert_eq!(host.state(), HostState::Ready);
    }

    #[test]
    fn unreadable_docs_dir_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("missing");
        let host = build_host(&HostOptions {
            docs_dir: Some(gone),
            ..HostOptions::default()
        })
        .unwrap();
        assert_eq!(host.state(), HostState::Ready);
    }
}
