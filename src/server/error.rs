use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::pipelines::{token_classification::MergeError, PipelineError};

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine readable error kind
    pub error: String,

    /// Human readable description
    pub message: String,
}

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The pipeline produced a token stream that cannot be merged
    #[error("Invalid token stream: {0}")]
    Merge(#[from] MergeError),

    /// The NER pipeline itself failed
    #[error("NER pipeline failed: {0}")]
    Pipeline(#[from] PipelineError),
}

impl ServerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Merge(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Merge(_) => "invalid_tokens",
            ServerError::Pipeline(_) => "pipeline_error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        log::error!("{}", self);

        let body = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;
