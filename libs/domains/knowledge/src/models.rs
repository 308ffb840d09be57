use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Distance metric for similarity calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    DotProduct,
    Manhattan,
}

impl DistanceMetric {
    /// True when a larger score means a closer match.
    pub fn higher_is_better(&self) -> bool {
        matches!(self, DistanceMetric::Cosine | DistanceMetric::DotProduct)
    }
}

/// Vector collection configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VectorConfig {
    pub dimension: u64,
    pub distance: DistanceMetric,
}

impl VectorConfig {
    pub fn new(dimension: u64) -> Self {
        Self {
            dimension,
            distance: DistanceMetric::default(),
        }
    }

    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }
}

/// Collection information as reported by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CollectionInfo {
    pub name: String,
    pub config: VectorConfig,
    pub points_count: u64,
}

/// Result of a create-or-replace call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CollectionAck {
    pub name: String,
    pub dimension: u64,
    pub distance: DistanceMetric,
    /// An existing collection with this name was destroyed first.
    pub replaced: bool,
}

/// A stored point: id, embedding and JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DocumentPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    #[schema(value_type = Object)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl DocumentPoint {
    pub fn new(id: u64, vector: Vec<f32>) -> Self {
        Self {
            id,
            vector,
            payload: serde_json::Map::new(),
        }
    }

    /// Point carrying its source text under the `text` payload key.
    pub fn from_text(id: u64, vector: Vec<f32>, text: impl Into<String>) -> Self {
        let mut point = Self::new(id, vector);
        point
            .payload
            .insert("text".to_string(), serde_json::Value::String(text.into()));
        point
    }
}

/// Nearest-neighbour query against one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub vector: Vec<f32>,
    pub limit: u64,
}

impl SearchQuery {
    pub fn new(vector: Vec<f32>, limit: u64) -> Self {
        Self { vector, limit }
    }
}

/// Search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResult {
    pub id: u64,
    pub score: f32,
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStatus {
    /// Applied and searchable.
    Completed,
    /// Accepted by the store but not yet applied.
    Acknowledged,
}

/// Store acknowledgement for an upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpsertAck {
    pub operation_id: Option<u64>,
    pub status: UpsertStatus,
    pub point_ids: Vec<u64>,
}

/// Embedding provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderType {
    FastEmbed,
    OpenAI,
    Hashing,
}

impl fmt::Display for EmbeddingProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EmbeddingProviderType::FastEmbed => "fastembed",
            EmbeddingProviderType::OpenAI => "openai",
            EmbeddingProviderType::Hashing => "hashing",
        };
        f.write_str(name)
    }
}

impl FromStr for EmbeddingProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fastembed" => Ok(EmbeddingProviderType::FastEmbed),
            "openai" => Ok(EmbeddingProviderType::OpenAI),
            "hashing" => Ok(EmbeddingProviderType::Hashing),
            other => Err(format!(
                "unknown embedding provider '{}', expected fastembed, openai or hashing",
                other
            )),
        }
    }
}

/// How point ids are assigned when documents are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointIdStrategy {
    /// Continue after the highest id stored in the collection.
    #[default]
    Monotonic,
    /// `index_in_batch + 1` on every call; later batches overwrite earlier ones.
    PerBatch,
}

impl PointIdStrategy {
    /// Ids for a batch of `len` documents, given the first id the store
    /// reports as free.
    pub fn allocate(&self, next_free_id: u64, len: usize) -> Vec<u64> {
        let start = match self {
            PointIdStrategy::Monotonic => next_free_id,
            PointIdStrategy::PerBatch => 1,
        };
        (start..start + len as u64).collect()
    }
}

impl FromStr for PointIdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monotonic" => Ok(PointIdStrategy::Monotonic),
            "per_batch" => Ok(PointIdStrategy::PerBatch),
            other => Err(format!(
                "unknown point id strategy '{}', expected monotonic or per_batch",
                other
            )),
        }
    }
}
