use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or_default, env_required};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{EmbeddingError, EmbeddingResult};
use crate::models::{Embedding, EmbeddingModel};
use crate::provider::EmbeddingProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// OpenAI embedding provider configuration
#[derive(Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: EmbeddingModel,
    /// Requested output size; `None` keeps the model's native dimension
    pub dimensions: Option<u32>,
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: EmbeddingModel::default(),
            dimensions: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: EmbeddingModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Length every returned vector must have
    pub fn expected_dimension(&self) -> u32 {
        self.dimensions.unwrap_or_else(|| self.model.dimension())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let Some(dimensions) = self.dimensions else {
            return Ok(());
        };

        let invalid = |details: String| ConfigError::Invalid {
            key: "OPENAI_EMBEDDING_DIMENSIONS".to_string(),
            details,
        };

        if !self.model.supports_dimensions() {
            return Err(invalid(format!("{} has a fixed output size", self.model)));
        }
        if dimensions == 0 || dimensions > self.model.dimension() {
            return Err(invalid(format!(
                "must be between 1 and {} for {}",
                self.model.dimension(),
                self.model
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Load OpenAIConfig from environment variables
///
/// Environment variables:
/// - `OPENAI_API_KEY` (required)
/// - `OPENAI_BASE_URL` (optional, default: https://api.openai.com/v1)
/// - `OPENAI_EMBEDDING_MODEL` (optional, default: text-embedding-3-small)
/// - `OPENAI_EMBEDDING_DIMENSIONS` (optional) - shorter vectors for 3-series models
/// - `OPENAI_TIMEOUT_SECS` (optional, default: 30)
impl FromEnv for OpenAIConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("OPENAI_API_KEY")?;
        let base_url = env_or_default("OPENAI_BASE_URL", DEFAULT_BASE_URL);
        let model = env_parse_or_default("OPENAI_EMBEDDING_MODEL", EmbeddingModel::default())?;
        let timeout_secs = env_parse_or_default("OPENAI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        let dimensions = match std::env::var("OPENAI_EMBEDDING_DIMENSIONS") {
            Ok(raw) if !raw.trim().is_empty() => {
                Some(raw.trim().parse::<u32>().map_err(|e| ConfigError::ParseError {
                    key: "OPENAI_EMBEDDING_DIMENSIONS".to_string(),
                    details: e.to_string(),
                })?)
            }
            _ => None,
        };

        let config = Self {
            api_key,
            base_url,
            model,
            dimensions,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }
}

/// OpenAI embeddings provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> EmbeddingResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Build from `OPENAI_*` variables; fails before any request when the key is unset
    pub fn from_env() -> EmbeddingResult<Self> {
        Self::new(OpenAIConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn dimension(&self) -> u32 {
        self.config.expected_dimension()
    }

    #[instrument(skip(self, text), fields(model = %self.config.model, chars = text.len()))]
    async fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let request = EmbeddingRequest {
            model: self.config.model.model_name(),
            input: text,
            dimensions: self.config.dimensions,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EmbeddingError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Decode(e.to_string()))?;

        let tokens_used = body.usage.map(|u| u.total_tokens).unwrap_or_default();
        let values = body
            .data
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResponse)?
            .embedding;

        let expected = self.dimension();
        if values.len() != expected as usize {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }

        tracing::debug!(tokens_used, "Embedding generated");
        Ok(Embedding {
            values,
            dimension: expected,
            tokens_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode as HttpStatus, routing::post};
    use serde_json::{Value, json};

    /// Serve `handler` at `/embeddings` on an ephemeral port and return the base URL
    async fn stub<H, T>(handler: H) -> String
    where
        H: axum::handler::Handler<T, ()>,
        T: 'static,
    {
        let app = Router::new().route("/embeddings", post(handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(base_url: String) -> OpenAIProvider {
        OpenAIProvider::new(OpenAIConfig::new("sk-test").with_base_url(base_url)).unwrap()
    }

    async fn echo_dimension(
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (HttpStatus, Json<Value>) {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
            return (HttpStatus::UNAUTHORIZED, Json(json!({"error": "bad key"})));
        }
        let size = body["dimensions"].as_u64().unwrap_or(1536) as usize;
        (
            HttpStatus::OK,
            Json(json!({
                "data": [{ "embedding": vec![0.25_f32; size], "index": 0 }],
                "model": body["model"],
                "usage": { "prompt_tokens": 4, "total_tokens": 4 }
            })),
        )
    }

    #[tokio::test]
    async fn test_embed_returns_configured_dimension() {
        let base_url = stub(echo_dimension).await;
        let provider = provider(base_url);

        let embedding = provider.embed("Wireless noise cancelling headphones").await.unwrap();

        assert_eq!(embedding.values.len(), 1536);
        assert_eq!(embedding.dimension, provider.dimension());
        assert_eq!(embedding.tokens_used, 4);
    }

    #[tokio::test]
    async fn test_embed_sends_dimensions_override() {
        let base_url = stub(echo_dimension).await;
        let provider = OpenAIProvider::new(
            OpenAIConfig::new("sk-test")
                .with_base_url(base_url)
                .with_dimensions(256),
        )
        .unwrap();

        let embedding = provider.embed("ergonomic office chair").await.unwrap();
        assert_eq!(embedding.values.len(), 256);
    }

    #[tokio::test]
    async fn test_wrong_length_is_dimension_mismatch() {
        let base_url = stub(|| async {
            Json(json!({ "data": [{ "embedding": [0.1, 0.2, 0.3], "index": 0 }] }))
        })
        .await;

        let err = provider(base_url).embed("laptop").await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch { expected: 1536, actual: 3 }
        ));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let base_url = stub(echo_dimension).await;
        let provider =
            OpenAIProvider::new(OpenAIConfig::new("sk-wrong").with_base_url(base_url)).unwrap();

        let err = provider.embed("laptop").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Unauthorized { status: 401 }));
    }

    #[tokio::test]
    async fn test_server_error_carries_body() {
        let base_url = stub(|| async { (HttpStatus::TOO_MANY_REQUESTS, "rate limited") }).await;

        let err = provider(base_url).embed("laptop").await.unwrap_err();
        match err {
            EmbeddingError::Api { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_data_is_empty_response() {
        let base_url = stub(|| async { Json(json!({ "data": [] })) }).await;

        let err = provider(base_url).embed("laptop").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_empty_text_never_reaches_the_api() {
        let provider = provider("http://127.0.0.1:1".to_string());
        assert!(matches!(
            provider.embed("   ").await,
            Err(EmbeddingError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let provider = provider("http://127.0.0.1:1".to_string());
        assert!(matches!(
            provider.embed("laptop").await,
            Err(EmbeddingError::Http(_))
        ));
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-env")),
                ("OPENAI_BASE_URL", Some("http://localhost:8080/v1")),
                ("OPENAI_EMBEDDING_MODEL", Some("text-embedding-3-large")),
                ("OPENAI_EMBEDDING_DIMENSIONS", None),
                ("OPENAI_TIMEOUT_SECS", None),
            ],
            || {
                let config = OpenAIConfig::from_env().unwrap();
                assert_eq!(config.api_key, "sk-env");
                assert_eq!(config.base_url, "http://localhost:8080/v1");
                assert_eq!(config.model, EmbeddingModel::TextEmbedding3Large);
                assert_eq!(config.expected_dimension(), 3072);
            },
        );
    }

    #[test]
    fn test_config_from_env_requires_api_key() {
        temp_env::with_var_unset("OPENAI_API_KEY", || {
            let err = OpenAIConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "OPENAI_API_KEY"));
        });
    }

    #[test]
    fn test_config_rejects_unknown_model() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-env")),
                ("OPENAI_EMBEDDING_MODEL", Some("text-davinci-003")),
            ],
            || {
                assert!(matches!(
                    OpenAIConfig::from_env(),
                    Err(ConfigError::ParseError { .. })
                ));
            },
        );
    }

    #[test]
    fn test_dimensions_override_validation() {
        let too_large = OpenAIConfig::new("k").with_dimensions(4096);
        assert!(OpenAIProvider::new(too_large).is_err());

        let fixed_model = OpenAIConfig::new("k")
            .with_model(EmbeddingModel::TextEmbeddingAda002)
            .with_dimensions(512);
        assert!(matches!(
            OpenAIProvider::new(fixed_model),
            Err(EmbeddingError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let rendered = format!("{:?}", OpenAIConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
    }
}
