
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

use super::Transcriber;
use crate::config::Config;
use crate::transport::{FilePart, HttpClient, run_blocking};
use crate::{RagError, Result};

/// Client for whisper.cpp's `whisper-server` `/inference` endpoint
#[derive(Debug, Clone)]
pub struct WhisperClient {
    endpoint: Url,
    http: HttpClient,
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    text: String,
}

impl WhisperClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let endpoint = config
            .transcription_url()?
            .join("/inference")
            .map_err(|e| RagError::Config(format!("Failed to build transcription URL: {}", e)))?;

        Ok(Self {
            endpoint,
            http: HttpClient::new(config.request_timeout()),
        })
    }

    /// Transcribe in-memory WAV bytes on the calling thread
    #[inline]
    pub fn transcribe_bytes(&self, audio: &[u8]) -> Result<String> {
        debug!("Uploading {} bytes of audio to {}", audio.len(), self.endpoint);

        let response: InferenceResponse = self.http.post_multipart(
            &self.endpoint,
            FilePart {
                field: "file",
                file_name: "audio.wav",
                content_type: "audio/wav",
                data: audio,
            },
        )?;

        Ok(response.text.trim().to_string())
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let audio = tokio::fs::read(audio_path).await?;
        info!(
            "Transcribing {} ({} bytes)",
            audio_path.display(),
            audio.len()
        );

        let client = self.clone();
        run_blocking(move || client.transcribe_bytes(&audio)).await
    }
}
