#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::RagError;

pub const CONFIG_FILE_NAME: &str = "config.toml";
const APP_DIR_NAME: &str = "asr-rag";
const MAX_EMBEDDING_DIMENSION: u32 = 65_536;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServicesConfig {
    pub transcription_url: String,
    pub ollama_url: String,
    /// LanceDB URI; plain paths are resolved against the config directory
    pub vector_store_uri: String,
    /// Per-request transport deadline, 0 disables it
    pub request_timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            transcription_url: "http://localhost:8080".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            vector_store_uri: "vectors".to_string(),
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelsConfig {
    pub embedding: String,
    pub correction: String,
    pub embedding_dimension: u32,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            embedding: "nomic-embed-text".to_string(),
            correction: "llama3.2:3b".to_string(),
            embedding_dimension: 768,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CollectionConfig {
    pub name: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: "go_terms".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Results shown for an interactive search
    pub search_limit: usize,
    /// Grounding terms handed to the correction model
    pub correction_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            search_limit: 5,
            correction_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CorpusConfig {
    pub path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("corpus.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CaptureConfig {
    pub program: String,
    pub default_seconds: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: "arecord".to_string(),
            default_seconds: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL for {0}: {1}")]
    InvalidUrl(&'static str, String),
    #[error("Invalid vector store URI: {0:?} (cannot be empty)")]
    InvalidVectorStoreUri(String),
    #[error("Invalid {0} model name: {1:?} (cannot be empty)")]
    InvalidModel(&'static str, String),
    #[error("Invalid embedding dimension: {0} (must be between 1 and 65536)")]
    InvalidEmbeddingDimension(u32),
    #[error("Invalid collection name: {0:?} (use letters, digits, '_' or '-')")]
    InvalidCollectionName(String),
    #[error("Invalid {0}: {1} (must be at least 1)")]
    InvalidLimit(&'static str, usize),
    #[error("Invalid capture program: {0:?} (cannot be empty)")]
    InvalidCaptureProgram(String),
    #[error("Invalid default capture length: {0} seconds (must be at least 1)")]
    InvalidCaptureSeconds(u32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl From<ConfigError> for RagError {
    #[inline]
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl Config {
    /// Load `config.toml` from `config_dir`, falling back to defaults when the file is absent
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ollama_url()?;
        self.transcription_url()?;

        if self.services.vector_store_uri.trim().is_empty() {
            return Err(ConfigError::InvalidVectorStoreUri(
                self.services.vector_store_uri.clone(),
            ));
        }

        if self.models.embedding.trim().is_empty() {
            return Err(ConfigError::InvalidModel(
                "embedding",
                self.models.embedding.clone(),
            ));
        }

        if self.models.correction.trim().is_empty() {
            return Err(ConfigError::InvalidModel(
                "correction",
                self.models.correction.clone(),
            ));
        }

        if !(1..=MAX_EMBEDDING_DIMENSION).contains(&self.models.embedding_dimension) {
            return Err(ConfigError::InvalidEmbeddingDimension(
                self.models.embedding_dimension,
            ));
        }

        let name = &self.collection.name;
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::InvalidCollectionName(name.clone()));
        }

        if self.retrieval.search_limit == 0 {
            return Err(ConfigError::InvalidLimit(
                "search limit",
                self.retrieval.search_limit,
            ));
        }

        if self.retrieval.correction_limit == 0 {
            return Err(ConfigError::InvalidLimit(
                "correction limit",
                self.retrieval.correction_limit,
            ));
        }

        if self.capture.program.trim().is_empty() {
            return Err(ConfigError::InvalidCaptureProgram(
                self.capture.program.clone(),
            ));
        }

        if self.capture.default_seconds == 0 {
            return Err(ConfigError::InvalidCaptureSeconds(
                self.capture.default_seconds,
            ));
        }

        Ok(())
    }

    #[inline]
    pub fn ollama_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.services.ollama_url)
            .map_err(|_| ConfigError::InvalidUrl("ollama", self.services.ollama_url.clone()))
    }

    #[inline]
    pub fn transcription_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.services.transcription_url).map_err(|_| {
            ConfigError::InvalidUrl("transcription", self.services.transcription_url.clone())
        })
    }

    /// Resolve the LanceDB URI, anchoring plain paths at the config directory
    #[inline]
    pub fn vector_store_uri(&self) -> String {
        let uri = &self.services.vector_store_uri;
        if uri.contains("://") {
            return uri.clone();
        }

        let path = Path::new(uri);
        if path.is_absolute() {
            uri.clone()
        } else {
            self.base_dir.join(path).display().to_string()
        }
    }

    #[inline]
    pub fn corpus_path(&self) -> PathBuf {
        if self.corpus.path.is_absolute() {
            self.corpus.path.clone()
        } else {
            self.base_dir.join(&self.corpus.path)
        }
    }

    #[inline]
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.services.request_timeout_secs > 0)
            .then(|| Duration::from_secs(self.services.request_timeout_secs))
    }

    #[inline]
    pub fn embedding_dimension(&self) -> usize {
        self.models.embedding_dimension as usize
    }
}
