//! The knowledge index: build wholesale, search read-only.

use tracing::{debug, info};
use uuid::Uuid;

use crabdesk_core::error::KnowledgeError;
use crabdesk_core::knowledge::{Document, KnowledgeChunk, SearchHit};

use crate::chunk::{chunk_words, normalize_whitespace};
use crate::embedding::{cosine_similarity, embed_text};

/// An in-memory similarity index over document chunks.
///
/// `new()` yields an unbuilt index; `search` on it is an error, distinct
/// from a built index returning no matches. `build` replaces the whole
/// index, never extends it.
pub struct KnowledgeIndex {
    chunk_size: usize,
    chunk_overlap: usize,
    chunks: Vec<KnowledgeChunk>,
    documents: usize,
    built: bool,
}

impl KnowledgeIndex {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            chunks: Vec::new(),
            documents: 0,
            built: false,
        }
    }

    /// Chunk and embed the given documents, replacing any previous
    /// contents. Fails without touching existing state when the corpus is
    /// empty or produces no chunks.
    pub fn build(&mut self, documents: &[Document]) -> Result<(), KnowledgeError> {
        if documents.is_empty() {
            return Err(KnowledgeError::IndexUnavailable(
                "no documents supplied".into(),
            ));
        }

        let mut chunks = Vec::new();
        for doc in documents {
            let text = normalize_whitespace(&doc.text);
            for piece in chunk_words(&text, self.chunk_size, self.chunk_overlap) {
                let embedding = embed_text(&piece);
                chunks.push(KnowledgeChunk {
                    id: Uuid::new_v4().to_string(),
                    source: doc.source.clone(),
                    text: piece,
                    embedding,
                });
            }
        }

        if chunks.is_empty() {
            return Err(KnowledgeError::IndexUnavailable(
                "corpus produced no chunks".into(),
            ));
        }

        info!(
            documents = documents.len(),
            chunks = chunks.len(),
            "knowledge index built"
        );
        self.chunks = chunks;
        self.documents = documents.len();
        self.built = true;
        Ok(())
    }

    /// Rank chunks by cosine similarity to the query.
    ///
    /// Returns at most `k` hits in non-increasing score order; equal
    /// scores keep chunk insertion order (the sort is stable). Errors
    /// when the index was never built.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, KnowledgeError> {
        if !self.built {
            return Err(KnowledgeError::IndexUnavailable("index not built".into()));
        }

        let query_embedding = embed_text(query);
        let mut hits: Vec<SearchHit> = self
            .chunks
            .iter()
            .map(|chunk| SearchHit {
                content: chunk.text.clone(),
                source: chunk.source.clone(),
                score: cosine_similarity(&chunk.embedding, &query_embedding),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);

        debug!(query_len = query.len(), hits = hits.len(), "knowledge search");
        Ok(hits)
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Number of documents in the last successful build.
    pub fn document_count(&self) -> usize {
        self.documents
    }

    /// Number of chunks in the last successful build.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}
