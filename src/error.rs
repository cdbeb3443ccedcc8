//! Error types for the catalog cache
//!
//! Upstream failures, durable mirror failures and HTTP API errors, built with thiserror.
//! Confirmed absence is never an error: collaborators report it as `Ok(None)`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Fetch Error ==
/// Transient failure talking to the upstream catalog.
///
/// Every variant means "we could not find out", never "it does not exist",
/// so none of them may be negative-cached.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network or transport failure
    #[error("upstream request failed: {0}")]
    Http(String),

    /// Upstream answered with an unexpected status
    #[error("upstream returned status {0}")]
    Status(u16),

    /// Upstream body did not match the expected record shape
    #[error("failed to decode upstream record: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

// == Mirror Error ==
/// Failure of the session-scoped durable mirror. Always swallowed by the cache.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Storage is not available in this execution context
    #[error("durable mirror unavailable")]
    Unavailable,

    /// Value could not be encoded or decoded
    #[error("mirror serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage rejected the operation (quota, disabled, ...)
    #[error("mirror storage error: {0}")]
    Storage(String),
}

// == API Error ==
/// Errors surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No catalog entry for the requested key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Result of an upstream call.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result of a durable mirror call.
pub type MirrorResult<T> = std::result::Result<T, MirrorError>;
