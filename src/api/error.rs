//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::index::IndexError;
use crate::query::QueryError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Query parsing or execution error
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Query did not finish before its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Query(e) => match e {
                QueryError::UnrecognizedPrefix(_) => (StatusCode::BAD_REQUEST, "INVALID_DATE_PREFIX"),
                QueryError::InvalidSize(_) => (StatusCode::BAD_REQUEST, "INVALID_SIZE"),
                QueryError::GranularityMismatch { .. } => {
                    (StatusCode::BAD_REQUEST, "GRANULARITY_MISMATCH")
                }
                QueryError::Index(IndexError::Decode { .. } | IndexError::MissingInput(_)) => {
                    (StatusCode::BAD_REQUEST, "INVALID_DATE_PREFIX")
                }
                QueryError::Index(_) | QueryError::Execution(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "QUERY_ERROR")
                }
            },
            ApiError::Timeout(_) => (StatusCode::SERVICE_UNAVAILABLE, "QUERY_TIMEOUT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Rejected request"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
