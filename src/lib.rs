use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote service returned status {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub mod capture;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod correction;
pub mod database;
pub mod embeddings;
pub mod indexer;
pub mod pipeline;
pub mod transcription;
pub mod transport;
