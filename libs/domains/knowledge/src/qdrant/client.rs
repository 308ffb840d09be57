use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, CountPointsBuilder, CreateCollectionBuilder, Distance, GetPointsBuilder, ListValue,
    PointId, PointStruct, SearchPointsBuilder, Struct, UpdateStatus, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};

use super::QdrantConfig;
use crate::error::{VectorError, VectorResult};
use crate::models::{
    CollectionAck, CollectionInfo, DistanceMetric, DocumentPoint, SearchQuery, SearchResult,
    UpsertAck, UpsertStatus, VectorConfig,
};
use crate::repository::{
    VectorRepository, boundary_tie, rank_results, validate_config, validate_points,
    validate_query,
};

type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Qdrant-backed implementation of VectorRepository
///
/// Existence and dimension are checked against `collection_info` before
/// writes and searches, so callers get `CollectionNotFound` or
/// `DimensionMismatch` instead of an opaque server error. Anything else the
/// server or transport reports becomes `StoreUnavailable`.
pub struct QdrantRepository {
    client: Qdrant,
}

impl QdrantRepository {
    pub fn new(config: QdrantConfig) -> VectorResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| VectorError::Config(format!("Failed to build Qdrant client: {}", e)))?;

        tracing::info!(url = %config.url, "Qdrant client configured");
        Ok(Self { client })
    }

    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
            DistanceMetric::DotProduct => Distance::Dot,
            DistanceMetric::Manhattan => Distance::Manhattan,
        }
    }

    fn from_qdrant_distance(distance: Distance) -> DistanceMetric {
        match distance {
            Distance::Euclid => DistanceMetric::Euclidean,
            Distance::Dot => DistanceMetric::DotProduct,
            Distance::Manhattan => DistanceMetric::Manhattan,
            _ => DistanceMetric::Cosine,
        }
    }

    fn point_id_to_u64(point_id: Option<&PointId>) -> VectorResult<u64> {
        match point_id.and_then(|p| p.point_id_options.as_ref()) {
            Some(qdrant::point_id::PointIdOptions::Num(num)) => Ok(*num),
            Some(qdrant::point_id::PointIdOptions::Uuid(uuid)) => Err(VectorError::Internal(
                format!("Unexpected UUID point id '{}'", uuid),
            )),
            None => Err(VectorError::Internal("Missing point ID".to_string())),
        }
    }

    fn payload_to_qdrant(payload: JsonMap) -> HashMap<String, QdrantValue> {
        payload
            .into_iter()
            .filter_map(|(key, val)| json_to_qdrant_value(val).map(|v| (key, v)))
            .collect()
    }

    fn qdrant_to_payload(payload: HashMap<String, QdrantValue>) -> Option<JsonMap> {
        if payload.is_empty() {
            return None;
        }

        Some(
            payload
                .into_iter()
                .filter_map(|(key, val)| qdrant_value_to_json(val).map(|v| (key, v)))
                .collect(),
        )
    }

    /// Vector size and metric from a collection config.
    fn extract_config_params(config: Option<&qdrant::CollectionConfig>) -> Option<VectorConfig> {
        let vectors = config?.params.as_ref()?.vectors_config.as_ref()?;
        let params = match vectors.config.as_ref()? {
            qdrant::vectors_config::Config::Params(p) => p,
            // Named vectors: knowledge collections only ever create one.
            qdrant::vectors_config::Config::ParamsMap(map) => map.map.values().next()?,
        };

        Some(
            VectorConfig::new(params.size)
                .with_distance(Self::from_qdrant_distance(params.distance())),
        )
    }

    /// One `search_points` call, optionally cut off at `score_threshold`.
    async fn search_page(
        &self,
        name: &str,
        vector: &[f32],
        limit: u64,
        score_threshold: Option<f32>,
    ) -> VectorResult<Vec<SearchResult>> {
        let mut builder = SearchPointsBuilder::new(name, vector.to_vec(), limit).with_payload(true);
        if let Some(threshold) = score_threshold {
            builder = builder.score_threshold(threshold);
        }

        let response = self.client.search_points(builder).await?;
        response
            .result
            .into_iter()
            .map(|point| {
                Ok(SearchResult {
                    id: Self::point_id_to_u64(point.id.as_ref())?,
                    score: point.score,
                    payload: Self::qdrant_to_payload(point.payload),
                })
            })
            .collect()
    }

    async fn require_collection(&self, name: &str) -> VectorResult<CollectionInfo> {
        self.collection_info(name)
            .await?
            .ok_or_else(|| VectorError::CollectionNotFound(name.to_string()))
    }
}

/// `None` when `next` is free, otherwise the id to try after the highest
/// taken one.
fn skip_taken(next: u64, taken: &[u64]) -> Option<u64> {
    taken.iter().copied().filter(|id| *id >= next).max().map(|max| max + 1)
}

fn json_to_qdrant_value(val: serde_json::Value) -> Option<QdrantValue> {
    use qdrant::value::Kind;

    let kind = match val {
        serde_json::Value::Null => return None,
        serde_json::Value::Bool(b) => Kind::BoolValue(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Kind::IntegerValue(i),
            None => Kind::DoubleValue(n.as_f64()?),
        },
        serde_json::Value::String(s) => Kind::StringValue(s),
        serde_json::Value::Array(items) => Kind::ListValue(ListValue {
            values: items.into_iter().filter_map(json_to_qdrant_value).collect(),
        }),
        serde_json::Value::Object(map) => Kind::StructValue(Struct {
            fields: map
                .into_iter()
                .filter_map(|(k, v)| json_to_qdrant_value(v).map(|v| (k, v)))
                .collect(),
        }),
    };

    Some(QdrantValue { kind: Some(kind) })
}

fn qdrant_value_to_json(val: QdrantValue) -> Option<serde_json::Value> {
    use qdrant::value::Kind;

    match val.kind? {
        Kind::NullValue(_) => Some(serde_json::Value::Null),
        Kind::BoolValue(b) => Some(serde_json::Value::Bool(b)),
        Kind::IntegerValue(i) => Some(serde_json::Value::Number(i.into())),
        Kind::DoubleValue(f) => serde_json::Number::from_f64(f).map(serde_json::Value::Number),
        Kind::StringValue(s) => Some(serde_json::Value::String(s)),
        Kind::ListValue(list) => Some(serde_json::Value::Array(
            list.values
                .into_iter()
                .filter_map(qdrant_value_to_json)
                .collect(),
        )),
        Kind::StructValue(s) => Some(serde_json::Value::Object(
            s.fields
                .into_iter()
                .filter_map(|(k, v)| qdrant_value_to_json(v).map(|v| (k, v)))
                .collect(),
        )),
    }
}

#[async_trait]
impl VectorRepository for QdrantRepository {
    async fn create_or_replace(
        &self,
        name: &str,
        config: VectorConfig,
    ) -> VectorResult<CollectionAck> {
        validate_config(&config)?;

        let replaced = self.client.collection_exists(name).await?;
        if replaced {
            tracing::info!(collection = %name, "Dropping existing collection before recreate");
            self.client.delete_collection(name).await?;
        }

        let builder = CreateCollectionBuilder::new(name).vectors_config(VectorParamsBuilder::new(
            config.dimension,
            Self::to_qdrant_distance(config.distance),
        ));
        self.client.create_collection(builder).await?;

        Ok(CollectionAck {
            name: name.to_string(),
            dimension: config.dimension,
            distance: config.distance,
            replaced,
        })
    }

    async fn collection_info(&self, name: &str) -> VectorResult<Option<CollectionInfo>> {
        if !self.client.collection_exists(name).await? {
            return Ok(None);
        }

        let info = self
            .client
            .collection_info(name)
            .await?
            .result
            .ok_or_else(|| VectorError::Internal("Collection info missing result".to_string()))?;

        let config = Self::extract_config_params(info.config.as_ref()).ok_or_else(|| {
            VectorError::Internal(format!("Collection '{}' has no vector params", name))
        })?;

        Ok(Some(CollectionInfo {
            name: name.to_string(),
            config,
            points_count: info.points_count.unwrap_or_default(),
        }))
    }

    async fn next_point_id(&self, name: &str, count: usize) -> VectorResult<u64> {
        self.require_collection(name).await?;

        let exact = self
            .client
            .count(CountPointsBuilder::new(name).exact(true))
            .await?
            .result
            .ok_or_else(|| VectorError::Internal("Count response missing result".to_string()))?
            .count;

        // Ids written here are dense, so `exact + 1` is normally free. Points
        // written by anyone else may not be; step past them.
        let window = count.max(1) as u64;
        let mut next = exact + 1;
        loop {
            let candidates: Vec<PointId> = (next..next + window).map(PointId::from).collect();
            let taken = self
                .client
                .get_points(
                    GetPointsBuilder::new(name, candidates)
                        .with_payload(false)
                        .with_vectors(false),
                )
                .await?
                .result
                .iter()
                .map(|point| Self::point_id_to_u64(point.id.as_ref()))
                .collect::<VectorResult<Vec<u64>>>()?;

            match skip_taken(next, &taken) {
                None => return Ok(next),
                Some(after) => next = after,
            }
        }
    }

    async fn upsert(&self, name: &str, points: Vec<DocumentPoint>) -> VectorResult<UpsertAck> {
        let collection = self.require_collection(name).await?;
        validate_points(collection.config.dimension, &points)?;

        let point_ids: Vec<u64> = points.iter().map(|p| p.id).collect();
        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| PointStruct::new(p.id, p.vector, Self::payload_to_qdrant(p.payload)))
            .collect();

        let response = self
            .client
            .upsert_points(UpsertPointsBuilder::new(name, points).wait(true))
            .await?;

        let result = response
            .result
            .ok_or_else(|| VectorError::Internal("Upsert response missing result".to_string()))?;

        let status = match result.status() {
            UpdateStatus::Completed => UpsertStatus::Completed,
            UpdateStatus::Acknowledged => UpsertStatus::Acknowledged,
            other => {
                return Err(VectorError::StoreUnavailable(format!(
                    "Upsert into '{}' ended with status {:?}",
                    name, other
                )));
            }
        };

        Ok(UpsertAck {
            operation_id: result.operation_id,
            status,
            point_ids,
        })
    }

    async fn search(&self, name: &str, query: SearchQuery) -> VectorResult<Vec<SearchResult>> {
        let collection = self.require_collection(name).await?;
        validate_query(collection.config.dimension, &query)?;
        let metric = collection.config.distance;

        // One extra hit shows whether a score tie crosses the page boundary.
        let mut results = self
            .search_page(name, &query.vector, query.limit.saturating_add(1), None)
            .await?;
        rank_results(&mut results, metric);

        if let Some(tied_score) = boundary_tie(&results, query.limit) {
            // Qdrant orders ties arbitrarily; pull every hit at least as good
            // as the tied score so the lowest ids win.
            let mut fetch = query.limit.saturating_mul(2).max(query.limit.saturating_add(2));
            results = loop {
                let hits = self
                    .search_page(name, &query.vector, fetch, Some(tied_score))
                    .await?;
                if (hits.len() as u64) < fetch || fetch == u64::MAX {
                    break hits;
                }
                fetch = fetch.saturating_mul(2);
            };
            tracing::debug!(
                collection = %name,
                tied_score,
                candidates = results.len(),
                "Expanded search across tied scores"
            );
            rank_results(&mut results, metric);
        }

        results.truncate(usize::try_from(query.limit).unwrap_or(usize::MAX));
        Ok(results)
    }

    async fn health_check(&self) -> VectorResult<()> {
        self.client.health_check().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_round_trip_keeps_nested_values() {
        let payload = json!({
            "text": "Berlin is the capital of Germany",
            "rank": 3,
            "weight": 0.5,
            "tags": ["city", "capital"],
            "meta": {"source": "wiki"},
            "dropped": null
        });
        let serde_json::Value::Object(map) = payload else {
            unreachable!()
        };

        let qdrant_payload = QdrantRepository::payload_to_qdrant(map);
        assert!(!qdrant_payload.contains_key("dropped"));

        let back = QdrantRepository::qdrant_to_payload(qdrant_payload).unwrap();
        assert_eq!(back["text"], "Berlin is the capital of Germany");
        assert_eq!(back["rank"], 3);
        assert_eq!(back["weight"], 0.5);
        assert_eq!(back["tags"], json!(["city", "capital"]));
        assert_eq!(back["meta"]["source"], "wiki");
    }

    #[test]
    fn test_empty_payload_is_none() {
        assert!(QdrantRepository::qdrant_to_payload(HashMap::new()).is_none());
    }

    #[test]
    fn test_distance_mapping_round_trips() {
        for metric in [
            DistanceMetric::Cosine,
            DistanceMetric::Euclidean,
            DistanceMetric::DotProduct,
            DistanceMetric::Manhattan,
        ] {
            let distance = QdrantRepository::to_qdrant_distance(metric);
            assert_eq!(QdrantRepository::from_qdrant_distance(distance), metric);
        }
    }

    #[test]
    fn test_numeric_point_ids_only() {
        let numeric = PointId::from(42u64);
        assert_eq!(
            QdrantRepository::point_id_to_u64(Some(&numeric)).unwrap(),
            42
        );

        let uuid = PointId::from("6a0b7a5e-2f1d-4c1b-9a3e-1b2c3d4e5f60".to_string());
        assert!(QdrantRepository::point_id_to_u64(Some(&uuid)).is_err());
        assert!(QdrantRepository::point_id_to_u64(None).is_err());
    }

    #[test]
    fn test_extract_config_params() {
        let config = qdrant::CollectionConfig {
            params: Some(qdrant::CollectionParams {
                vectors_config: Some(qdrant::VectorsConfig {
                    config: Some(qdrant::vectors_config::Config::Params(
                        qdrant::VectorParams {
                            size: 384,
                            distance: Distance::Cosine as i32,
                            ..Default::default()
                        },
                    )),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let extracted = QdrantRepository::extract_config_params(Some(&config)).unwrap();
        assert_eq!(extracted.dimension, 384);
        assert_eq!(extracted.distance, DistanceMetric::Cosine);
        assert!(QdrantRepository::extract_config_params(None).is_none());
    }

    #[test]
    fn test_skip_taken_moves_past_highest_taken_id() {
        assert_eq!(skip_taken(5, &[]), None);
        assert_eq!(skip_taken(5, &[6, 5]), Some(7));
        assert_eq!(skip_taken(5, &[3]), None);
    }

    #[test]
    fn test_new_accepts_default_config() {
        assert!(QdrantRepository::new(QdrantConfig::default()).is_ok());
    }
}
