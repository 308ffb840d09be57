use async_trait::async_trait;

use super::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::EmbeddingProviderType;

pub const DEFAULT_HASHING_DIMENSION: usize = 384;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Bag-of-words feature hashing into a fixed number of buckets.
///
/// Tokens are lowercase alphanumeric runs. Each token adds one to the bucket
/// picked by its FNV-1a hash, and the result is L2-normalised. A text with
/// no tokens embeds to the all-zero vector. No model, no network.
#[derive(Debug, Clone)]
pub struct HashingProvider {
    dimension: usize,
}

impl HashingProvider {
    pub fn new(dimension: usize) -> VectorResult<Self> {
        if dimension == 0 {
            return Err(VectorError::Config(
                "hashing embedding dimension must be positive".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let bucket = (fnv1a(&token) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashingProvider {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_HASHING_DIMENSION,
        }
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait]
impl EmbeddingProvider for HashingProvider {
    fn provider_type(&self) -> EmbeddingProviderType {
        EmbeddingProviderType::Hashing
    }

    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_embedding_has_configured_dimension() {
        let provider = HashingProvider::new(64).unwrap();
        let vector = provider.embed("Berlin is the capital of Germany").await.unwrap();
        assert_eq!(vector.len(), 64);
    }

    #[tokio::test]
    async fn test_embedding_is_deterministic_and_normalised() {
        let provider = HashingProvider::default();
        let a = provider.embed("The quick brown fox").await.unwrap();
        let b = provider.embed("the QUICK, brown fox!").await.unwrap();
        assert_eq!(a, b);

        let norm = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_text_without_tokens_is_zero_vector() {
        let provider = HashingProvider::new(16).unwrap();
        let vector = provider.embed("  ...  ").await.unwrap();
        assert_eq!(vector, vec![0.0; 16]);
    }

    #[tokio::test]
    async fn test_shared_words_score_higher() {
        let provider = HashingProvider::default();
        let query = provider.embed("capital of Germany").await.unwrap();
        let berlin = provider.embed("Berlin is the capital of Germany").await.unwrap();
        let paris = provider.embed("Paris is the capital of France").await.unwrap();
        assert!(cosine(&query, &berlin) > cosine(&query, &paris));
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let provider = HashingProvider::default();
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let batch = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], provider.embed("alpha").await.unwrap());
        assert_eq!(batch[1], provider.embed("beta").await.unwrap());
        assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_zero_dimension_is_rejected() {
        assert!(matches!(
            HashingProvider::new(0),
            Err(VectorError::Config(_))
        ));
    }
}
