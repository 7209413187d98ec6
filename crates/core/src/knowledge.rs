//! Knowledge base types — documents in, chunks and search hits out.

use serde::{Deserialize, Serialize};

/// A source document before chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier, typically the file stem
    pub id: String,

    /// Display name used for source attribution, typically the file name
    pub source: String,

    /// Full document text
    pub text: String,
}

/// One embedded chunk of a document. Built once per index build,
/// read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Unique chunk id
    pub id: String,

    /// Source document this chunk came from
    pub source: String,

    /// Chunk text
    pub text: String,

    /// Embedding vector; never serialized onto the wire
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// One search result, ranked by similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Chunk text
    pub content: String,

    /// Source document attribution
    pub source: String,

    /// Cosine similarity to the query, higher is closer
    pub score: f32,
}
