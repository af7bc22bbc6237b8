//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::DomainError;
use serde_json::json;
use thiserror::Error;

use crate::repositories::StoreError;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, invalid, expired or revoked credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not permitted
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Too many failed logins
    #[error("Too many attempts")]
    TooManyRequests,

    /// A domain rule rejected the request
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(e) => ApiError::Domain(e),
            StoreError::Database(e) => ApiError::Database(e),
            StoreError::Internal(_) => ApiError::InternalServerError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many failed attempts, try again later".to_string(),
            ),
            ApiError::Domain(err) => {
                let status = match &err {
                    DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                    DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                    DomainError::InvalidTransition { .. }
                    | DomainError::InsufficientStock { .. }
                    | DomainError::Conflict(_) => StatusCode::CONFLICT,
                };
                (status, err.to_string())
            }
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
