//! Knowledge retrieval for crabdesk.
//!
//! Documents are chunked into overlapping word windows, embedded with a
//! deterministic token-hash scheme, and ranked by cosine similarity. The
//! whole pipeline is pure Rust with no model downloads, so retrieval is
//! reproducible and works offline.

pub mod chunk;
pub mod embedding;
pub mod index;

pub use embedding::{EMBEDDING_DIM, cosine_similarity, embed_text};
pub use index::KnowledgeIndex;
