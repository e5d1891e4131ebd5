// Database module
// The glossary vector index: one collection of term records queried by cosine similarity

pub mod lancedb;

use async_trait::async_trait;

use crate::Result;

pub use self::lancedb::LanceVectorIndex;

/// A glossary entry as stored in the index
#[derive(Debug, Clone, PartialEq)]
pub struct TermRecord {
    /// Position of the entry in the corpus
    pub id: u64,
    pub term: String,
    pub definition: String,
    /// Embedding of `term: definition`
    pub vector: Vec<f32>,
}

/// One ranked hit from a similarity query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub term: String,
    pub definition: String,
    /// Cosine similarity, higher is closer
    pub score: f32,
}

/// Anything that can hold term records and rank them against a query vector
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection unless it already exists; safe to call repeatedly
    async fn ensure_collection(&self) -> Result<()>;

    /// Insert or fully replace the record with `record.id`, returning once the write is committed
    async fn upsert(&self, record: &TermRecord) -> Result<()>;

    /// Up to `limit` records ordered by descending similarity to `vector`
    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchResult>>;
}
