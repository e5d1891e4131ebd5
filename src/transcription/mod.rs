// Transcription module
// Sends recorded audio to an external speech-to-text service

pub mod whisper;

use async_trait::async_trait;
use std::path::Path;

use crate::Result;

pub use whisper::WhisperClient;

/// Anything that can turn a WAV file (mono, 16-bit PCM, 16 kHz) into text
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}
