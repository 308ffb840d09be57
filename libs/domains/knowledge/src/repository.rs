use std::cmp::Ordering;

use async_trait::async_trait;

use crate::error::{VectorError, VectorResult};
use crate::models::{
    CollectionAck, CollectionInfo, DistanceMetric, DocumentPoint, SearchQuery, SearchResult,
    UpsertAck, VectorConfig,
};

/// Repository trait for vector collection storage
///
/// Implementations must honour these rules so that callers see the same
/// behaviour from every backend:
/// - `create_or_replace` destroys any same-named collection first.
/// - `upsert` is all-or-nothing on dimension checks and returns after the
///   points are searchable.
/// - `search` on a missing collection is `CollectionNotFound`, never empty.
/// - results are best-first, equal scores by ascending id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorRepository: Send + Sync {
    /// Create a collection, replacing any existing one with the same name
    async fn create_or_replace(
        &self,
        name: &str,
        config: VectorConfig,
    ) -> VectorResult<CollectionAck>;

    /// Look up a collection's configuration and size
    async fn collection_info(&self, name: &str) -> VectorResult<Option<CollectionInfo>>;

    /// First id of a run of `count` ids that no stored point uses.
    ///
    /// Exact, unlike `CollectionInfo::points_count`, which some backends
    /// only estimate.
    async fn next_point_id(&self, name: &str, count: usize) -> VectorResult<u64>;

    /// Insert or overwrite points by id
    async fn upsert(&self, name: &str, points: Vec<DocumentPoint>) -> VectorResult<UpsertAck>;

    /// Nearest-neighbour search
    async fn search(&self, name: &str, query: SearchQuery) -> VectorResult<Vec<SearchResult>>;

    /// Check that the backing store is reachable
    async fn health_check(&self) -> VectorResult<()>;
}

pub(crate) fn validate_config(config: &VectorConfig) -> VectorResult<()> {
    if config.dimension == 0 {
        return Err(VectorError::Validation(
            "Collection dimension must be positive".to_string(),
        ));
    }
    Ok(())
}

/// First vector whose length differs from `expected`, as a mismatch error.
pub(crate) fn check_dimensions<'a>(
    expected: u64,
    vectors: impl IntoIterator<Item = &'a [f32]>,
) -> VectorResult<()> {
    match vectors
        .into_iter()
        .map(|v| v.len() as u64)
        .find(|len| *len != expected)
    {
        Some(actual) => Err(VectorError::DimensionMismatch { expected, actual }),
        None => Ok(()),
    }
}

pub(crate) fn validate_points(expected: u64, points: &[DocumentPoint]) -> VectorResult<()> {
    check_dimensions(expected, points.iter().map(|p| p.vector.as_slice()))
}

pub(crate) fn validate_query(expected: u64, query: &SearchQuery) -> VectorResult<()> {
    if query.limit == 0 {
        return Err(VectorError::Validation(
            "Search limit must be at least 1".to_string(),
        ));
    }
    check_dimensions(expected, [query.vector.as_slice()])
}

/// Order hits best-first for the metric, breaking score ties by ascending id.
pub(crate) fn rank_results(results: &mut [SearchResult], metric: DistanceMetric) {
    results.sort_by(|a, b| {
        let by_score = if metric.higher_is_better() {
            b.score.total_cmp(&a.score)
        } else {
            a.score.total_cmp(&b.score)
        };
        match by_score {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        }
    });
}

/// Score shared by the last hit inside `limit` and the first hit past it.
///
/// `results` must already be ranked. When this is `Some`, more points with
/// the same score may exist beyond the fetched page, and the lowest ids
/// among them are not guaranteed to be present.
pub(crate) fn boundary_tie(results: &[SearchResult], limit: u64) -> Option<f32> {
    let limit = usize::try_from(limit).ok()?;
    if limit == 0 {
        return None;
    }
    let last = results.get(limit - 1)?;
    let next = results.get(limit)?;
    (last.score == next.score).then_some(last.score)
}
