use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model server unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Unavailable(err.to_string())
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        let message = err.to_string();
        match err {
            ModelError::Unavailable(_) => AppError::domain(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::ModelServerUnavailable,
                message,
            ),
            ModelError::Validation(_) => {
                AppError::domain(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
            }
        }
    }
}

impl IntoResponse for ModelError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
