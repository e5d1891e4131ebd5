
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{Corrector, GroundingTerm, build_system_prompt};
use crate::config::Config;
use crate::transport::{HttpClient, run_blocking};
use crate::{RagError, Result};

/// Correction gateway backed by Ollama's `/api/chat` endpoint
#[derive(Debug, Clone)]
pub struct OllamaCorrector {
    endpoint: Url,
    model: String,
    http: HttpClient,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: Role,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

impl OllamaCorrector {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config
            .ollama_url()?
            .join("/api/chat")
            .map_err(|e| RagError::Config(format!("Failed to build chat URL: {}", e)))?;

        Ok(Self {
            endpoint,
            model: config.models.correction.clone(),
            http: HttpClient::new(config.request_timeout()),
        })
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    pub fn correct_blocking(&self, transcript: &str, terms: &[GroundingTerm]) -> Result<String> {
        debug!(
            "Requesting correction from {} with {} grounding terms",
            self.model,
            terms.len()
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: build_system_prompt(terms),
                },
                ChatMessage {
                    role: Role::User,
                    content: transcript.to_string(),
                },
            ],
            stream: false,
        };

        let response: ChatResponse = self.http.post_json(&self.endpoint, &request)?;
        Ok(response.message.content)
    }
}

#[async_trait]
impl Corrector for OllamaCorrector {
    async fn correct(&self, transcript: &str, terms: &[GroundingTerm]) -> Result<String> {
        let client = self.clone();
        let transcript = transcript.to_owned();
        let terms = terms.to_vec();
        run_blocking(move || client.correct_blocking(&transcript, &terms)).await
    }
}
