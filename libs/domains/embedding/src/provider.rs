use async_trait::async_trait;

use crate::error::EmbeddingResult;
use crate::models::Embedding;

/// Trait for embedding generation providers
///
/// One call is one remote round trip. Nothing is cached, batched or retried.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Length of every vector this provider returns
    fn dimension(&self) -> u32;

    /// Generate the embedding for a single text
    async fn embed(&self, text: &str) -> EmbeddingResult<Embedding>;
}
