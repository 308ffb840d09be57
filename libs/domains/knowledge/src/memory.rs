use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{VectorError, VectorResult};
use crate::models::{
    CollectionAck, CollectionInfo, DistanceMetric, DocumentPoint, SearchQuery, SearchResult,
    UpsertAck, UpsertStatus, VectorConfig,
};
use crate::repository::{
    VectorRepository, rank_results, validate_config, validate_points, validate_query,
};

struct Collection {
    config: VectorConfig,
    points: BTreeMap<u64, DocumentPoint>,
}

/// In-memory implementation of VectorRepository (for testing and
/// single-process deployments). Scoring is exact.
#[derive(Clone, Default)]
pub struct InMemoryVectorRepository {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
    operations: Arc<AtomicU64>,
}

impl InMemoryVectorRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn score(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        DistanceMetric::Cosine => {
            let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
            let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm_a == 0.0 || norm_b == 0.0 {
                0.0
            } else {
                dot / (norm_a * norm_b)
            }
        }
        DistanceMetric::DotProduct => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
        DistanceMetric::Manhattan => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
    }
}

#[async_trait]
impl VectorRepository for InMemoryVectorRepository {
    async fn create_or_replace(
        &self,
        name: &str,
        config: VectorConfig,
    ) -> VectorResult<CollectionAck> {
        validate_config(&config)?;

        let mut collections = self.collections.write().await;
        let replaced = collections
            .insert(
                name.to_string(),
                Collection {
                    config,
                    points: BTreeMap::new(),
                },
            )
            .is_some();

        Ok(CollectionAck {
            name: name.to_string(),
            dimension: config.dimension,
            distance: config.distance,
            replaced,
        })
    }

    async fn collection_info(&self, name: &str) -> VectorResult<Option<CollectionInfo>> {
        let collections = self.collections.read().await;
        Ok(collections.get(name).map(|c| CollectionInfo {
            name: name.to_string(),
            config: c.config,
            points_count: c.points.len() as u64,
        }))
    }

    async fn next_point_id(&self, name: &str, _count: usize) -> VectorResult<u64> {
        let collections = self.collections.read().await;
        let collection = collections
            .get(name)
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))?;
        Ok(collection.points.keys().next_back().map_or(1, |max| max + 1))
    }

    async fn upsert(&self, name: &str, points: Vec<DocumentPoint>) -> VectorResult<UpsertAck> {
        let mut collections = self.collections.write().await;
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))?;

        validate_points(collection.config.dimension, &points)?;

        let point_ids: Vec<u64> = points.iter().map(|p| p.id).collect();
        for point in points {
            collection.points.insert(point.id, point);
        }

        Ok(UpsertAck {
            operation_id: Some(self.operations.fetch_add(1, Ordering::Relaxed)),
            status: UpsertStatus::Completed,
            point_ids,
        })
    }

    async fn search(&self, name: &str, query: SearchQuery) -> VectorResult<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let collection = collections
            .get(name)
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))?;

        validate_query(collection.config.dimension, &query)?;

        let metric = collection.config.distance;
        let mut results: Vec<SearchResult> = collection
            .points
            .values()
            .map(|point| SearchResult {
                id: point.id,
                score: score(metric, &query.vector, &point.vector),
                payload: Some(point.payload.clone()),
            })
            .collect();

        rank_results(&mut results, metric);
        results.truncate(usize::try_from(query.limit).unwrap_or(usize::MAX));
        Ok(results)
    }

    async fn health_check(&self) -> VectorResult<()> {
        Ok(())
    }
}
