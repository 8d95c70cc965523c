//! Error types for the storefront cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the store, the workers and the HTTP surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation against a key holding a different kind of value
    #[error("Wrong value type for key: {0}")]
    WrongType(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backing store could not complete the operation
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Row content could not be serialized for publishing
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A background worker did not stop within its grace period
    #[error("Worker '{name}' still running after {grace:?}")]
    ShutdownTimeout { name: String, grace: Duration },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::WrongType(_) => StatusCode::CONFLICT,
            CacheError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Serialization(_)
            | CacheError::ShutdownTimeout { .. }
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the storefront cache.
pub type Result<T> = std::result::Result<T, CacheError>;
