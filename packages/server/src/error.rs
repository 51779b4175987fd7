use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use vod_cache::CacheError;

use crate::listing::ListingError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `BAD_GATEWAY`, `INTERNAL_ERROR`.
    pub code: &'static str,
    /// Human-readable error description.
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    /// The origin could not be reached or answered with an unexpected status.
    BadGateway(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::BadGateway(msg) => {
                tracing::warn!("Origin failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "BAD_GATEWAY",
                        message: msg,
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::MalformedName { .. } => AppError::Validation(err.to_string()),
            CacheError::OriginNotFound { status: 404, .. } => AppError::NotFound(err.to_string()),
            CacheError::OriginNotFound { .. } | CacheError::OriginUnreachable { .. } => {
                AppError::BadGateway(err.to_string())
            }
            CacheError::CorruptCache { .. } | CacheError::Store(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<ListingError> for AppError {
    fn from(err: ListingError) -> Self {
        AppError::BadGateway(err.to_string())
    }
}
