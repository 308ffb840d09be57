//! REST handlers for model management

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use axum_helpers::{ErrorResponse, ValidatedJson};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use validator::Validate;

use crate::client::{OllamaClient, PullOutcome};
use crate::error::ModelResult;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DownloadModelRequest {
    /// Ollama model tag, e.g. `llama3` or `nomic-embed-text:latest`
    #[validate(length(min = 1, message = "model_name must not be empty"))]
    pub model_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadModelResponse {
    pub detail: String,
    /// Upstream response body when the pull was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ask the Ollama server to download a model
///
/// Blocks until the pull finishes. The upstream status code is returned as is.
#[utoipa::path(
    post,
    path = "/ollama/download_model",
    tag = "ollama",
    request_body = DownloadModelRequest,
    responses(
        (status = 200, description = "Model downloaded", body = DownloadModelResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 503, description = "Ollama unreachable", body = ErrorResponse)
    )
)]
pub async fn download_model(
    State(client): State<Arc<OllamaClient>>,
    ValidatedJson(request): ValidatedJson<DownloadModelRequest>,
) -> ModelResult<(StatusCode, Json<DownloadModelResponse>)> {
    let PullOutcome {
        status,
        detail,
        error,
    } = client.pull_model(&request.model_name).await?;
    Ok((status, Json(DownloadModelResponse { detail, error })))
}

#[derive(OpenApi)]
#[openapi(
    paths(download_model),
    components(schemas(DownloadModelRequest, DownloadModelResponse, ErrorResponse)),
    tags(
        (name = "ollama", description = "Model downloads on the Ollama server")
    )
)]
pub struct ModelsApiDoc;

pub fn router(client: Arc<OllamaClient>) -> Router {
    Router::new()
        .route("/ollama/download_model", post(download_model))
        .with_state(client)
}
