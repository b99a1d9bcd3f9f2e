//! Embedding Domain
//!
//! Turns text into fixed-length vectors through a remote embedding API.
//!
//! # Example
//!
//! ```ignore
//! use domain_embedding::{EmbeddingProvider, OpenAIProvider};
//!
//! // Reads OPENAI_API_KEY (required) and the optional OPENAI_* settings
//! let provider = OpenAIProvider::from_env()?;
//! let embedding = provider.embed("lightweight running shoes").await?;
//! assert_eq!(embedding.values.len(), provider.dimension() as usize);
//! ```

pub mod error;
pub mod models;
pub mod openai;
pub mod provider;

pub use error::{EmbeddingError, EmbeddingResult};
pub use models::{Embedding, EmbeddingModel};
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::EmbeddingProvider;

