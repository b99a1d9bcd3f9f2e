use strum::{Display, EnumString, IntoStaticStr};

/// Supported OpenAI embedding models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, IntoStaticStr)]
pub enum EmbeddingModel {
    /// text-embedding-3-small (1536 dimensions)
    #[default]
    #[strum(serialize = "text-embedding-3-small")]
    TextEmbedding3Small,
    /// text-embedding-3-large (3072 dimensions)
    #[strum(serialize = "text-embedding-3-large")]
    TextEmbedding3Large,
    /// text-embedding-ada-002 (1536 dimensions, legacy)
    #[strum(serialize = "text-embedding-ada-002")]
    TextEmbeddingAda002,
}

impl EmbeddingModel {
    /// Native output dimension
    pub fn dimension(&self) -> u32 {
        match self {
            EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
            EmbeddingModel::TextEmbeddingAda002 => 1536,
        }
    }

    pub fn model_name(&self) -> &'static str {
        self.into()
    }

    /// Whether the API accepts a `dimensions` override for this model
    pub fn supports_dimensions(&self) -> bool {
        !matches!(self, EmbeddingModel::TextEmbeddingAda002)
    }
}

/// A single embedding returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub values: Vec<f32>,
    pub dimension: u32,
    pub tokens_used: u32,
}

impl Embedding {
    /// Widen to the `f64` vectors stored in documents
    pub fn into_vector(self) -> Vec<f64> {
        self.values.into_iter().map(f64::from).collect()
    }
}
