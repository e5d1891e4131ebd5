// Embeddings module
// Turns text into fixed-length vectors through an external embedding service

pub mod ollama;

use async_trait::async_trait;

use crate::Result;

pub use ollama::OllamaEmbedder;

/// Anything that can embed a piece of text into a single vector
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
