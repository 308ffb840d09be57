//! REST handlers for the knowledge endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use axum_helpers::{ErrorResponse, ValidatedJson};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use validator::Validate;

use crate::error::VectorResult;
use crate::models::{CollectionAck, DistanceMetric, SearchResult, UpsertAck, UpsertStatus};
use crate::repository::VectorRepository;
use crate::service::{DEFAULT_SEARCH_LIMIT, KnowledgeService};

// ===== Request DTOs =====

/// Request to create (or recreate) a collection
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCollectionRequest {
    #[validate(length(min = 1, message = "collection_name must not be empty"))]
    pub collection_name: String,
}

/// Request to embed and store documents
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddVectorsRequest {
    #[validate(length(min = 1, message = "docs must contain at least one document"))]
    pub docs: Vec<String>,
    #[validate(length(min = 1, message = "collection_name must not be empty"))]
    pub collection_name: String,
}

fn default_limit() -> u64 {
    DEFAULT_SEARCH_LIMIT
}

/// Request to search a collection with free text
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SearchVectorsRequest {
    #[validate(length(min = 1, message = "query_text must not be empty"))]
    pub query_text: String,
    #[validate(length(min = 1, message = "collection_name must not be empty"))]
    pub collection_name: String,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    #[schema(default = 3, minimum = 1)]
    pub limit: u64,
}

// ===== Handlers =====

/// Create a collection, replacing any existing one with the same name
#[utoipa::path(
    post,
    path = "/knowledge/create_collection",
    tag = "knowledge",
    request_body = CreateCollectionRequest,
    responses(
        (status = 200, description = "Collection created", body = CollectionAck),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 503, description = "Vector store unavailable", body = ErrorResponse)
    )
)]
pub async fn create_collection<R: VectorRepository>(
    State(service): State<Arc<KnowledgeService<R>>>,
    ValidatedJson(request): ValidatedJson<CreateCollectionRequest>,
) -> VectorResult<Json<CollectionAck>> {
    let ack = service.create_collection(&request.collection_name).await?;
    Ok(Json(ack))
}

/// Embed documents and store them in a collection
#[utoipa::path(
    post,
    path = "/knowledge/add_vectors",
    tag = "knowledge",
    request_body = AddVectorsRequest,
    responses(
        (status = 200, description = "Documents stored", body = UpsertAck),
        (status = 400, description = "Invalid request or dimension mismatch", body = ErrorResponse),
        (status = 404, description = "Collection not found", body = ErrorResponse),
        (status = 503, description = "Embedding provider or vector store unavailable", body = ErrorResponse)
    )
)]
pub async fn add_vectors<R: VectorRepository>(
    State(service): State<Arc<KnowledgeService<R>>>,
    ValidatedJson(request): ValidatedJson<AddVectorsRequest>,
) -> VectorResult<Json<UpsertAck>> {
    let ack = service
        .add_documents(&request.docs, &request.collection_name)
        .await?;
    Ok(Json(ack))
}

/// Search a collection with free text
#[utoipa::path(
    post,
    path = "/knowledge/search_vectors",
    tag = "knowledge",
    request_body = SearchVectorsRequest,
    responses(
        (status = 200, description = "Ranked hits, best first", body = Vec<SearchResult>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Collection not found", body = ErrorResponse),
        (status = 503, description = "Embedding provider or vector store unavailable", body = ErrorResponse)
    )
)]
pub async fn search_vectors<R: VectorRepository>(
    State(service): State<Arc<KnowledgeService<R>>>,
    ValidatedJson(request): ValidatedJson<SearchVectorsRequest>,
) -> VectorResult<Json<Vec<SearchResult>>> {
    let results = service
        .search(&request.query_text, &request.collection_name, request.limit)
        .await?;
    Ok(Json(results))
}

/// OpenAPI documentation for the knowledge API
#[derive(OpenApi)]
#[openapi(
    paths(create_collection, add_vectors, search_vectors),
    components(
        schemas(
            CreateCollectionRequest, AddVectorsRequest, SearchVectorsRequest,
            CollectionAck, UpsertAck, UpsertStatus, SearchResult, DistanceMetric,
            ErrorResponse
        )
    ),
    tags(
        (name = "knowledge", description = "Document embedding and similarity search")
    )
)]
pub struct KnowledgeApiDoc;

/// Knowledge routes with the service applied as state.
pub fn router<R: VectorRepository + 'static>(service: Arc<KnowledgeService<R>>) -> Router {
    Router::new()
        .route("/knowledge/create_collection", post(create_collection::<R>))
        .route("/knowledge/add_vectors", post(add_vectors::<R>))
        .route("/knowledge/search_vectors", post(search_vectors::<R>))
        .with_state(service)
}
