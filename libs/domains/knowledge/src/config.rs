//! Environment-driven selection of the embedding provider and vector store.

use std::str::FromStr;
use std::sync::Arc;

use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};

use crate::embedding::{
    DEFAULT_HASHING_DIMENSION, EmbeddingProvider, HashingProvider, OpenAIProvider,
};
use crate::error::{VectorError, VectorResult};
use crate::models::{EmbeddingProviderType, PointIdStrategy};
use crate::qdrant::QdrantConfig;
use crate::service::KnowledgeOptions;

/// Which vector store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorStoreKind {
    Qdrant,
    Memory,
}

impl FromStr for VectorStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qdrant" => Ok(VectorStoreKind::Qdrant),
            "memory" | "in_memory" => Ok(VectorStoreKind::Memory),
            other => Err(format!(
                "unknown vector store '{}', expected qdrant or memory",
                other
            )),
        }
    }
}

/// Provider used when `EMBEDDING_PROVIDER` is unset.
pub fn default_provider_type() -> EmbeddingProviderType {
    if cfg!(feature = "fastembed") {
        EmbeddingProviderType::FastEmbed
    } else {
        EmbeddingProviderType::Hashing
    }
}

#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    pub store: VectorStoreKind,
    pub qdrant: QdrantConfig,
    pub provider: EmbeddingProviderType,
    /// Output size of the hashing provider; other providers report their own.
    pub hashing_dimension: usize,
    pub point_id_strategy: PointIdStrategy,
}

impl KnowledgeConfig {
    pub fn options(&self) -> KnowledgeOptions {
        KnowledgeOptions {
            point_id_strategy: self.point_id_strategy,
        }
    }

    /// Construct the configured embedding provider.
    ///
    /// Model loading happens here, once per process.
    pub async fn build_embedder(&self) -> VectorResult<Arc<dyn EmbeddingProvider>> {
        let provider: Arc<dyn EmbeddingProvider> = match self.provider {
            EmbeddingProviderType::Hashing => {
                Arc::new(HashingProvider::new(self.hashing_dimension)?)
            }
            EmbeddingProviderType::OpenAI => Arc::new(OpenAIProvider::from_env()),
            #[cfg(feature = "fastembed")]
            EmbeddingProviderType::FastEmbed => Arc::new(
                crate::embedding::FastEmbedProvider::new(
                    crate::embedding::FastEmbedConfig::from_env(),
                )
                .await?,
            ),
            #[cfg(not(feature = "fastembed"))]
            EmbeddingProviderType::FastEmbed => {
                return Err(VectorError::Config(
                    "EMBEDDING_PROVIDER=fastembed requires building with the `fastembed` feature"
                        .to_string(),
                ));
            }
        };

        tracing::info!(provider = %self.provider, "Embedding provider ready");
        Ok(provider)
    }
}

fn parse_var<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr<Err = String>,
{
    env_or_default(key, default)
        .parse()
        .map_err(|details| ConfigError::ParseError {
            key: key.to_string(),
            details,
        })
}

impl FromEnv for KnowledgeConfig {
    /// - VECTOR_STORE: `qdrant` (default) or `memory`
    /// - EMBEDDING_PROVIDER: `fastembed`, `openai` or `hashing`
    /// - EMBEDDING_DIMENSION: hashing output size, default 384
    /// - POINT_ID_STRATEGY: `monotonic` (default) or `per_batch`
    fn from_env() -> Result<Self, ConfigError> {
        let store = parse_var("VECTOR_STORE", "qdrant")?;
        let provider = parse_var("EMBEDDING_PROVIDER", &default_provider_type().to_string())?;
        let point_id_strategy = parse_var("POINT_ID_STRATEGY", "monotonic")?;
        let hashing_dimension = env_parse_or("EMBEDDING_DIMENSION", DEFAULT_HASHING_DIMENSION)?;

        let qdrant = QdrantConfig::from_env().map_err(|e| ConfigError::ParseError {
            key: "QDRANT_TIMEOUT_SECS".to_string(),
            details: e.to_string(),
        })?;

        Ok(Self {
            store,
            qdrant,
            provider,
            hashing_dimension,
            point_id_strategy,
        })
    }
}
