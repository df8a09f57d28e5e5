//! Error responses shared by the API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use podmatch_core::{DirectoryError, MatchStoreError, PipelineError, ValidationError};

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error on its way to the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, "{}", self.message);
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<MatchStoreError> for ApiError {
    fn from(e: MatchStoreError) -> Self {
        let status = match &e {
            MatchStoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            MatchStoreError::InvalidTransition { .. } | MatchStoreError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            MatchStoreError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MatchStoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<DirectoryError> for ApiError {
    fn from(e: DirectoryError) -> Self {
        let status = match &e {
            DirectoryError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DirectoryError::NotFound(_) => StatusCode::NOT_FOUND,
            DirectoryError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            DirectoryError::HttpError(_)
            | DirectoryError::ApiError { .. }
            | DirectoryError::ParseError(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::unprocessable(e.to_string())
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Directory(e) => e.into(),
            PipelineError::Validation(e) => e.into(),
        }
    }
}
