
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::Embedder;
use crate::config::Config;
use crate::transport::{HttpClient, run_blocking};
use crate::{RagError, Result};

/// Embedding gateway backed by Ollama's `/api/embed` endpoint
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    endpoint: Url,
    model: String,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedder {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config
            .ollama_url()?
            .join("/api/embed")
            .map_err(|e| RagError::Config(format!("Failed to build embedding URL: {}", e)))?;

        Ok(Self {
            endpoint,
            model: config.models.embedding.clone(),
            http: HttpClient::new(config.request_timeout()),
        })
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed `text` on the calling thread
    #[inline]
    pub fn embed_blocking(&self, text: &str) -> Result<Vec<f32>> {
        debug!(
            "Generating embedding with {} for text (length: {})",
            self.model,
            text.len()
        );

        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };
        let response: EmbedResponse = self.http.post_json(&self.endpoint, &request)?;

        // Ollama answers with a batch; a single input yields the first element
        let embedding = response.embeddings.into_iter().next().ok_or_else(|| {
            RagError::EmptyResult("embedding service returned no vectors".to_string())
        })?;

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let client = self.clone();
        let text = text.to_owned();
        run_blocking(move || client.embed_blocking(&text)).await
    }
}
