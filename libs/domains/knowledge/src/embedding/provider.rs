use async_trait::async_trait;

use crate::error::{VectorError, VectorResult};
use crate::models::EmbeddingProviderType;

/// Sentence embedded once at startup to learn the provider's vector length.
pub const DIMENSION_PROBE_TEXT: &str = "This is a sample sentence to get the vector dimension.";

/// Trait for embedding generation providers
///
/// Implementations are deterministic for a fixed model and input. Every
/// failure is reported as [`VectorError::ProviderUnavailable`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the provider type
    fn provider_type(&self) -> EmbeddingProviderType;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>>;
}

/// Embed [`DIMENSION_PROBE_TEXT`] and return the resulting vector length.
pub async fn probe_dimension(provider: &dyn EmbeddingProvider) -> VectorResult<u64> {
    let vector = provider.embed(DIMENSION_PROBE_TEXT).await?;
    if vector.is_empty() {
        return Err(VectorError::ProviderUnavailable(format!(
            "{} provider returned an empty embedding",
            provider.provider_type()
        )));
    }

    tracing::info!(
        provider = %provider.provider_type(),
        dimension = vector.len(),
        "Probed embedding dimension"
    );
    Ok(vector.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_dimension_uses_sample_sentence() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .withf(|text| text == DIMENSION_PROBE_TEXT)
            .times(1)
            .returning(|_| Ok(vec![0.0; 384]));
        provider
            .expect_provider_type()
            .returning(|| EmbeddingProviderType::Hashing);

        assert_eq!(probe_dimension(&provider).await.unwrap(), 384);
    }

    #[tokio::test]
    async fn test_probe_dimension_rejects_empty_vector() {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().returning(|_| Ok(vec![]));
        provider
            .expect_provider_type()
            .returning(|| EmbeddingProviderType::OpenAI);

        let err = probe_dimension(&provider).await.unwrap_err();
        assert!(matches!(err, VectorError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_probe_dimension_propagates_provider_failure() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .returning(|_| Err(VectorError::ProviderUnavailable("model missing".into())));

        let err = probe_dimension(&provider).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
