use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use core_config::env_optional;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::EmbeddingProviderType;

pub const DEFAULT_FASTEMBED_MODEL: &str = "BAAI/bge-small-en-v1.5";

#[derive(Debug, Clone)]
pub struct FastEmbedConfig {
    /// Model code as published by fastembed, e.g. `BAAI/bge-small-en-v1.5`.
    pub model: String,
    pub cache_dir: Option<PathBuf>,
}

impl FastEmbedConfig {
    /// Reads `EMBEDDING_MODEL` and `EMBEDDING_CACHE_DIR`.
    pub fn from_env() -> Self {
        Self {
            model: env_optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_FASTEMBED_MODEL.to_string()),
            cache_dir: env_optional("EMBEDDING_CACHE_DIR").map(PathBuf::from),
        }
    }
}

impl Default for FastEmbedConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_FASTEMBED_MODEL.to_string(),
            cache_dir: None,
        }
    }
}

/// Local ONNX embedding model.
///
/// The model is loaded once in [`FastEmbedProvider::new`] and shared by all
/// callers. Inference needs `&mut`, so calls are serialised through a mutex
/// and run on the blocking pool.
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
}

impl FastEmbedProvider {
    /// Load the model, downloading it into the cache directory on first use.
    pub async fn new(config: FastEmbedConfig) -> VectorResult<Self> {
        let model = resolve_model(&config.model)?;

        let mut options = InitOptions::new(model).with_show_download_progress(false);
        if let Some(cache_dir) = config.cache_dir.clone() {
            options = options.with_cache_dir(cache_dir);
        }

        let model_name = config.model.clone();
        let embedding = tokio::task::spawn_blocking(move || TextEmbedding::try_new(options))
            .await
            .map_err(|e| VectorError::Internal(format!("Model loader panicked: {}", e)))?
            .map_err(|e| {
                VectorError::ProviderUnavailable(format!(
                    "Failed to load embedding model '{}': {}",
                    model_name, e
                ))
            })?;

        tracing::info!(model = %config.model, "Loaded fastembed model");

        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
        })
    }
}

fn resolve_model(code: &str) -> VectorResult<EmbeddingModel> {
    TextEmbedding::list_supported_models()
        .into_iter()
        .find(|info| info.model_code.eq_ignore_ascii_case(code))
        .map(|info| info.model)
        .ok_or_else(|| VectorError::Config(format!("Unsupported fastembed model '{}'", code)))
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    fn provider_type(&self) -> EmbeddingProviderType {
        EmbeddingProviderType::FastEmbed
    }

    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results.into_iter().next().ok_or_else(|| {
            VectorError::ProviderUnavailable("No embedding returned".to_string())
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let model = Arc::clone(&self.model);
        let documents = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut model = model.lock().map_err(|_| {
                VectorError::ProviderUnavailable("Embedding model lock poisoned".to_string())
            })?;
            model
                .embed(documents, None)
                .map_err(|e| VectorError::ProviderUnavailable(e.to_string()))
        })
        .await
        .map_err(|e| VectorError::Internal(format!("Embedding task panicked: {}", e)))?
    }
}
