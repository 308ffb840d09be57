//! Type-safe error codes for API responses.
//!
//! Each error code carries a string identifier for clients, an integer code
//! for logs and monitoring, and a default human-readable message.
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::CollectionNotFound;
//! assert_eq!(code.as_str(), "COLLECTION_NOT_FOUND");
//! assert_eq!(code.code(), 2001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// HTTP method is not allowed for the route
    MethodNotAllowed,

    // Server errors
    /// An unexpected internal server error occurred
    InternalError,

    /// Service was started with invalid configuration
    ConfigurationError,

    // Vector knowledge errors (2000-2999)
    /// Named collection does not exist in the vector store
    CollectionNotFound,

    /// Vector length does not match the collection dimension
    DimensionMismatch,

    /// Embedding provider could not produce vectors
    EmbeddingUnavailable,

    /// Vector store could not be reached or rejected the request
    VectorStoreUnavailable,

    // Upstream model server errors (3000-3999)
    /// Model server could not be reached
    ModelServerUnavailable,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for programmatic handling by clients.
    ///
    /// ```rust
    /// use axum_helpers::errors::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
    /// assert_eq!(ErrorCode::DimensionMismatch.as_str(), "DIMENSION_MISMATCH");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::CollectionNotFound => "COLLECTION_NOT_FOUND",
            Self::DimensionMismatch => "DIMENSION_MISMATCH",
            Self::EmbeddingUnavailable => "EMBEDDING_UNAVAILABLE",
            Self::VectorStoreUnavailable => "VECTOR_STORE_UNAVAILABLE",
            Self::ModelServerUnavailable => "MODEL_SERVER_UNAVAILABLE",
        }
    }

    /// Integer code for structured logs and metrics.
    ///
    /// - 1000-1999: Client and generic server errors
    /// - 2000-2999: Vector knowledge errors
    /// - 3000-3999: Upstream model server errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::MethodNotAllowed => 1012,
            Self::ConfigurationError => 1013,

            Self::CollectionNotFound => 2001,
            Self::DimensionMismatch => 2002,
            Self::EmbeddingUnavailable => 2003,
            Self::VectorStoreUnavailable => 2004,

            Self::ModelServerUnavailable => 3001,
        }
    }

    /// Default user-facing message. Handlers can override it with specifics.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::InternalError => "An internal server error occurred",
            Self::ConfigurationError => "Service is misconfigured",
            Self::CollectionNotFound => "Collection not found",
            Self::DimensionMismatch => "Vector dimension does not match the collection",
            Self::EmbeddingUnavailable => "Embedding provider is unavailable",
            Self::VectorStoreUnavailable => "Vector store is unavailable",
            Self::ModelServerUnavailable => "Model server is unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_string_representation() {
        assert_eq!(ErrorCode::ValidationError.as_str(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
        assert_eq!(
            ErrorCode::VectorStoreUnavailable.as_str(),
            "VECTOR_STORE_UNAVAILABLE"
        );
    }

    #[test]
    fn test_error_code_integer_codes() {
        assert_eq!(ErrorCode::ValidationError.code(), 1001);
        assert_eq!(ErrorCode::CollectionNotFound.code(), 2001);
        assert_eq!(ErrorCode::ModelServerUnavailable.code(), 3001);
    }

    #[test]
    fn test_error_code_messages() {
        assert_eq!(
            ErrorCode::ValidationError.default_message(),
            "Request validation failed"
        );
        assert_eq!(
            ErrorCode::CollectionNotFound.default_message(),
            "Collection not found"
        );
    }

    #[test]
    fn test_error_code_serialization_matches_as_str() {
        let codes = [
            ErrorCode::DimensionMismatch,
            ErrorCode::EmbeddingUnavailable,
            ErrorCode::MethodNotAllowed,
        ];
        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_error_code_deserialization() {
        let code: ErrorCode = serde_json::from_str("\"COLLECTION_NOT_FOUND\"").unwrap();
        assert_eq!(code, ErrorCode::CollectionNotFound);
    }
}
