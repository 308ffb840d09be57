use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: u64, actual: u64 },

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl VectorError {
    /// Whether a caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VectorError::ProviderUnavailable(_) | VectorError::StoreUnavailable(_)
        )
    }
}

impl From<qdrant_client::QdrantError> for VectorError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        VectorError::StoreUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        VectorError::ProviderUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for VectorError {
    fn from(err: serde_json::Error) -> Self {
        VectorError::Internal(format!("JSON error: {}", err))
    }
}

impl From<core_config::ConfigError> for VectorError {
    fn from(err: core_config::ConfigError) -> Self {
        VectorError::Config(err.to_string())
    }
}

/// Convert VectorError to AppError for standardized HTTP error responses
impl From<VectorError> for AppError {
    fn from(err: VectorError) -> Self {
        let message = err.to_string();
        let (status, code) = match err {
            VectorError::CollectionNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorCode::CollectionNotFound)
            }
            VectorError::DimensionMismatch { .. } => {
                (StatusCode::BAD_REQUEST, ErrorCode::DimensionMismatch)
            }
            VectorError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::ValidationError),
            VectorError::ProviderUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::EmbeddingUnavailable,
            ),
            VectorError::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::VectorStoreUnavailable,
            ),
            VectorError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::ConfigurationError,
            ),
            VectorError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError)
            }
        };
        AppError::domain(status, code, message)
    }
}

impl IntoResponse for VectorError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
