use core_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API rejected the API key ({status})")]
    Unauthorized { status: u16 },

    #[error("Embedding API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Malformed embedding response: {0}")]
    Decode(String),

    #[error("Embedding response contained no vectors")]
    EmptyResponse,

    #[error("Expected a {expected}-dimensional embedding, got {actual}")]
    DimensionMismatch { expected: u32, actual: usize },
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;
