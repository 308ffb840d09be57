use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::instrument;

use crate::embedding::{EmbeddingProvider, probe_dimension};
use crate::error::{VectorError, VectorResult};
use crate::models::{
    CollectionAck, DistanceMetric, DocumentPoint, EmbeddingProviderType, PointIdStrategy,
    SearchQuery, SearchResult, UpsertAck, VectorConfig,
};
use crate::repository::VectorRepository;

/// Number of hits returned when the caller does not ask for a limit.
pub const DEFAULT_SEARCH_LIMIT: u64 = 3;

/// Tunables for [`KnowledgeService::initialize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KnowledgeOptions {
    pub point_id_strategy: PointIdStrategy,
}

/// Knowledge service: turns text into vectors and keeps them searchable.
///
/// The vector dimension is probed once from the embedding provider at
/// startup and every collection created here uses it with cosine distance.
/// Writes to one collection are serialised so id allocation and upsert
/// happen as one step; different collections do not block each other.
pub struct KnowledgeService<R: VectorRepository> {
    repository: Arc<R>,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_dimension: u64,
    point_id_strategy: PointIdStrategy,
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<R: VectorRepository> KnowledgeService<R> {
    /// Probe the embedding dimension and build the service.
    ///
    /// A provider that cannot embed the probe sentence is fatal.
    pub async fn initialize(
        repository: Arc<R>,
        embedder: Arc<dyn EmbeddingProvider>,
        options: KnowledgeOptions,
    ) -> VectorResult<Self> {
        let vector_dimension = probe_dimension(embedder.as_ref()).await?;

        tracing::info!(
            provider = %embedder.provider_type(),
            vector_dimension,
            point_id_strategy = ?options.point_id_strategy,
            "Knowledge service initialized"
        );

        Ok(Self {
            repository,
            embedder,
            vector_dimension,
            point_id_strategy: options.point_id_strategy,
            write_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn vector_dimension(&self) -> u64 {
        self.vector_dimension
    }

    pub fn provider_type(&self) -> EmbeddingProviderType {
        self.embedder.provider_type()
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Create (or wipe and recreate) a cosine collection sized for this
    /// service's embeddings.
    #[instrument(skip(self), fields(dimension = self.vector_dimension))]
    pub async fn create_collection(&self, name: &str) -> VectorResult<CollectionAck> {
        let name = require_name(name)?;
        let config =
            VectorConfig::new(self.vector_dimension).with_distance(DistanceMetric::Cosine);

        let lock = self.write_lock(name).await;
        let _guard = lock.lock().await;

        let ack = self.repository.create_or_replace(name, config).await?;
        tracing::info!(replaced = ack.replaced, "Collection ready");
        Ok(ack)
    }

    /// Embed `texts` and store them in `collection_name`, payload `{"text": ...}`.
    ///
    /// Nothing is written unless every text embeds successfully.
    #[instrument(skip(self, texts), fields(batch_size = texts.len()))]
    pub async fn add_documents(
        &self,
        texts: &[String],
        collection_name: &str,
    ) -> VectorResult<UpsertAck> {
        let collection_name = require_name(collection_name)?;
        if texts.is_empty() {
            return Err(VectorError::Validation(
                "At least one document is required".to_string(),
            ));
        }
        if let Some(position) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(VectorError::Validation(format!(
                "Document at index {} is blank",
                position
            )));
        }

        self.require_compatible_collection(collection_name).await?;

        let vectors = self.embedder.embed_batch(texts).await?;
        if vectors.len() != texts.len() {
            return Err(VectorError::ProviderUnavailable(format!(
                "Embedding provider returned {} vectors for {} documents",
                vectors.len(),
                texts.len()
            )));
        }

        let lock = self.write_lock(collection_name).await;
        let _guard = lock.lock().await;

        let next_free_id = match self.point_id_strategy {
            PointIdStrategy::Monotonic => {
                self.repository
                    .next_point_id(collection_name, texts.len())
                    .await?
            }
            PointIdStrategy::PerBatch => 1,
        };

        let ids = self.point_id_strategy.allocate(next_free_id, texts.len());
        let points: Vec<DocumentPoint> = ids
            .into_iter()
            .zip(vectors)
            .zip(texts)
            .map(|((id, vector), text)| DocumentPoint::from_text(id, vector, text.as_str()))
            .collect();

        let ack = self.repository.upsert(collection_name, points).await?;
        tracing::info!(
            operation_id = ?ack.operation_id,
            status = ?ack.status,
            first_id = ack.point_ids.first().copied(),
            "Documents stored"
        );
        Ok(ack)
    }

    /// Embed `query_text` and return the `limit` nearest documents.
    #[instrument(skip(self, query_text))]
    pub async fn search(
        &self,
        query_text: &str,
        collection_name: &str,
        limit: u64,
    ) -> VectorResult<Vec<SearchResult>> {
        let collection_name = require_name(collection_name)?;
        if query_text.trim().is_empty() {
            return Err(VectorError::Validation(
                "Query text must not be blank".to_string(),
            ));
        }
        if limit == 0 {
            return Err(VectorError::Validation(
                "Search limit must be at least 1".to_string(),
            ));
        }

        let vector = self.embedder.embed(query_text).await?;
        let results = self
            .repository
            .search(collection_name, SearchQuery::new(vector, limit))
            .await?;

        tracing::debug!(hits = results.len(), "Search completed");
        Ok(results)
    }

    /// Vector store reachability.
    pub async fn health(&self) -> VectorResult<()> {
        self.repository.health_check().await
    }

    /// Fails unless the collection exists with our vector dimension.
    async fn require_compatible_collection(&self, name: &str) -> VectorResult<()> {
        let info = self
            .repository
            .collection_info(name)
            .await?
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))?;

        if info.config.dimension != self.vector_dimension {
            return Err(VectorError::DimensionMismatch {
                expected: info.config.dimension,
                actual: self.vector_dimension,
            });
        }

        Ok(())
    }

    /// Per-collection write lock. Entries nobody holds are pruned here, so
    /// the map only keeps collections with a write in flight.
    async fn write_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(name.to_string()).or_default())
    }
}

fn require_name(name: &str) -> VectorResult<&str> {
    if name.trim().is_empty() {
        return Err(VectorError::Validation(
            "Collection name must not be empty".to_string(),
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::models::{CollectionInfo, UpsertStatus};
    use crate::repository::MockVectorRepository;
    use mockall::predicate::*;

    const DIM: usize = 4;

    fn embedder() -> MockEmbeddingProvider {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed()
            .returning(|_| Ok(vec![0.5; DIM]));
        embedder
            .expect_provider_type()
            .returning(|| EmbeddingProviderType::Hashing);
        embedder
    }

    fn info(points_count: u64, dimension: u64) -> CollectionInfo {
        CollectionInfo {
            name: "docs".to_string(),
            config: VectorConfig::new(dimension),
            points_count,
        }
    }

    async fn service(
        repository: MockVectorRepository,
        embedder: MockEmbeddingProvider,
        strategy: PointIdStrategy,
    ) -> KnowledgeService<MockVectorRepository> {
        KnowledgeService::initialize(
            Arc::new(repository),
            Arc::new(embedder),
            KnowledgeOptions {
                point_id_strategy: strategy,
            },
        )
        .await
        .unwrap()
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_initialize_probes_dimension() {
        let svc = service(
            MockVectorRepository::new(),
            embedder(),
            PointIdStrategy::default(),
        )
        .await;
        assert_eq!(svc.vector_dimension(), DIM as u64);
    }

    #[tokio::test]
    async fn test_initialize_fails_when_provider_fails() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed()
            .returning(|_| Err(VectorError::ProviderUnavailable("no model".into())));

        let result = KnowledgeService::initialize(
            Arc::new(MockVectorRepository::new()),
            Arc::new(embedder),
            KnowledgeOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(VectorError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn test_create_collection_uses_probed_dimension_and_cosine() {
        let mut repo = MockVectorRepository::new();
        repo.expect_create_or_replace()
            .with(
                eq("docs"),
                eq(VectorConfig::new(DIM as u64).with_distance(DistanceMetric::Cosine)),
            )
            .times(1)
            .returning(|name, config| {
                Ok(CollectionAck {
                    name: name.to_string(),
                    dimension: config.dimension,
                    distance: config.distance,
                    replaced: false,
                })
            });

        let svc = service(repo, embedder(), PointIdStrategy::default()).await;
        let ack = svc.create_collection("docs").await.unwrap();
        assert_eq!(ack.dimension, DIM as u64);
    }

    #[tokio::test]
    async fn test_create_collection_rejects_empty_name() {
        let svc = service(
            MockVectorRepository::new(),
            embedder(),
            PointIdStrategy::default(),
        )
        .await;
        let err = svc.create_collection("  ").await.unwrap_err();
        assert!(matches!(err, VectorError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_documents_rejects_empty_and_blank_input() {
        let svc = service(
            MockVectorRepository::new(),
            embedder(),
            PointIdStrategy::default(),
        )
        .await;

        let err = svc.add_documents(&[], "docs").await.unwrap_err();
        assert!(matches!(err, VectorError::Validation(_)));

        let err = svc
            .add_documents(&texts(&["fine", "   "]), "docs")
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::Validation(msg) if msg.contains("index 1")));
    }

    #[tokio::test]
    async fn test_add_documents_missing_collection_skips_embedding() {
        let mut repo = MockVectorRepository::new();
        repo.expect_collection_info().returning(|_| Ok(None));
        repo.expect_upsert().never();

        let mut embedder = embedder();
        embedder.expect_embed_batch().never();

        let svc = service(repo, embedder, PointIdStrategy::default()).await;
        let err = svc
            .add_documents(&texts(&["hello"]), "docs")
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::CollectionNotFound(name) if name == "docs"));
    }

    #[tokio::test]
    async fn test_add_documents_dimension_mismatch_before_embedding() {
        let mut repo = MockVectorRepository::new();
        repo.expect_collection_info()
            .returning(|_| Ok(Some(info(0, 768))));
        repo.expect_upsert().never();

        let svc = service(repo, embedder(), PointIdStrategy::default()).await;
        let err = svc
            .add_documents(&texts(&["hello"]), "docs")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VectorError::DimensionMismatch {
                expected: 768,
                actual: 4
            }
        ));
    }

    #[tokio::test]
    async fn test_add_documents_embedding_failure_writes_nothing() {
        let mut repo = MockVectorRepository::new();
        repo.expect_collection_info()
            .returning(|_| Ok(Some(info(0, DIM as u64))));
        repo.expect_upsert().never();

        let mut embedder = embedder();
        embedder
            .expect_embed_batch()
            .returning(|_| Err(VectorError::ProviderUnavailable("timeout".into())));

        let svc = service(repo, embedder, PointIdStrategy::default()).await;
        let err = svc
            .add_documents(&texts(&["a", "b"]), "docs")
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_add_documents_monotonic_ids_come_from_store_not_point_count() {
        let mut repo = MockVectorRepository::new();
        // Reported count is approximate and must not drive id allocation.
        repo.expect_collection_info()
            .returning(|_| Ok(Some(info(7, DIM as u64))));
        repo.expect_next_point_id()
            .with(eq("docs"), eq(2usize))
            .times(1)
            .returning(|_, _| Ok(3));
        repo.expect_upsert()
            .withf(|name, points| {
                name == "docs"
                    && points.iter().map(|p| p.id).collect::<Vec<_>>() == vec![3, 4]
                    && points[0].payload["text"] == "first"
                    && points[1].payload["text"] == "second"
            })
            .times(1)
            .returning(|_, points| {
                Ok(UpsertAck {
                    operation_id: Some(7),
                    status: UpsertStatus::Completed,
                    point_ids: points.iter().map(|p| p.id).collect(),
                })
            });

        let mut embedder = embedder();
        embedder
            .expect_embed_batch()
            .returning(|texts| Ok(vec![vec![0.5; DIM]; texts.len()]));

        let svc = service(repo, embedder, PointIdStrategy::Monotonic).await;
        let ack = svc
            .add_documents(&texts(&["first", "second"]), "docs")
            .await
            .unwrap();
        assert_eq!(ack.point_ids, vec![3, 4]);
        assert_eq!(ack.operation_id, Some(7));
    }

    #[tokio::test]
    async fn test_add_documents_per_batch_ids_restart() {
        let mut repo = MockVectorRepository::new();
        repo.expect_collection_info()
            .times(1)
            .returning(|_| Ok(Some(info(10, DIM as u64))));
        repo.expect_next_point_id().never();
        repo.expect_upsert()
            .withf(|_, points| points.iter().map(|p| p.id).collect::<Vec<_>>() == vec![1, 2])
            .returning(|_, points| {
                Ok(UpsertAck {
                    operation_id: None,
                    status: UpsertStatus::Acknowledged,
                    point_ids: points.iter().map(|p| p.id).collect(),
                })
            });

        let mut embedder = embedder();
        embedder
            .expect_embed_batch()
            .returning(|texts| Ok(vec![vec![0.5; DIM]; texts.len()]));

        let svc = service(repo, embedder, PointIdStrategy::PerBatch).await;
        let ack = svc
            .add_documents(&texts(&["a", "b"]), "docs")
            .await
            .unwrap();
        assert_eq!(ack.status, UpsertStatus::Acknowledged);
    }

    #[tokio::test]
    async fn test_add_documents_short_embedding_batch_is_provider_error() {
        let mut repo = MockVectorRepository::new();
        repo.expect_collection_info()
            .returning(|_| Ok(Some(info(0, DIM as u64))));
        repo.expect_upsert().never();

        let mut embedder = embedder();
        embedder
            .expect_embed_batch()
            .returning(|_| Ok(vec![vec![0.5; DIM]]));

        let svc = service(repo, embedder, PointIdStrategy::default()).await;
        let err = svc
            .add_documents(&texts(&["a", "b"]), "docs")
            .await
            .unwrap_err();
        assert!(matches!(err, VectorError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_search_validates_before_embedding() {
        let mut repo = MockVectorRepository::new();
        repo.expect_search().never();

        let svc = service(repo, embedder(), PointIdStrategy::default()).await;

        let err = svc.search("  ", "docs", 3).await.unwrap_err();
        assert!(matches!(err, VectorError::Validation(_)));

        let err = svc.search("berlin", "docs", 0).await.unwrap_err();
        assert!(matches!(err, VectorError::Validation(_)));
    }

    #[tokio::test]
    async fn test_search_delegates_with_embedded_query() {
        let mut repo = MockVectorRepository::new();
        repo.expect_search()
            .withf(|name, query| name == "docs" && query.limit == 3 && query.vector.len() == DIM)
            .returning(|_, _| {
                Ok(vec![SearchResult {
                    id: 1,
                    score: 0.9,
                    payload: None,
                }])
            });

        let svc = service(repo, embedder(), PointIdStrategy::default()).await;
        let results = svc
            .search("capital of Germany", "docs", DEFAULT_SEARCH_LIMIT)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_propagates_missing_collection() {
        let mut repo = MockVectorRepository::new();
        repo.expect_search()
            .returning(|name, _| Err(VectorError::CollectionNotFound(name.to_string())));

        let svc = service(repo, embedder(), PointIdStrategy::default()).await;
        let err = svc.search("anything", "ghost", 1).await.unwrap_err();
        assert!(matches!(err, VectorError::CollectionNotFound(_)));
    }

    #[tokio::test]
    async fn test_health_delegates_to_repository() {
        let mut repo = MockVectorRepository::new();
        repo.expect_health_check()
            .returning(|| Err(VectorError::StoreUnavailable("down".into())));

        let svc = service(repo, embedder(), PointIdStrategy::default()).await;
        assert!(svc.health().await.is_err());
    }

    #[tokio::test]
    async fn test_write_locks_are_pruned_after_use() {
        let mut repo = MockVectorRepository::new();
        repo.expect_create_or_replace().returning(|name, config| {
            Ok(CollectionAck {
                name: name.to_string(),
                dimension: config.dimension,
                distance: config.distance,
                replaced: false,
            })
        });

        let svc = service(repo, embedder(), PointIdStrategy::default()).await;
        for i in 0..50 {
            svc.create_collection(&format!("c{}", i)).await.unwrap();
        }

        assert!(svc.write_locks.lock().await.len() <= 1);
    }
}
