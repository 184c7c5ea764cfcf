//! Error types.
//!
//! `AppError` is what a caller of the service can see. `FetchError` stays inside a
//! single fetch task and is degraded to an empty slot by the aggregator.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

/// Errors surfaced to the HTTP caller.
#[derive(Debug, Error)]
pub enum AppError {
    /// A query parameter failed to parse or is out of bounds.
    #[error("{name} param {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The aggregated result could not be encoded.
    #[error("failed to encode response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn not_an_integer(name: &'static str) -> Self {
        AppError::InvalidParameter {
            name,
            reason: "has to be an integer".to_string(),
        }
    }

    pub fn too_small(name: &'static str) -> Self {
        AppError::InvalidParameter {
            name,
            reason: "has to be greater than 0".to_string(),
        }
    }

    pub fn too_large(name: &'static str, max: i64) -> Self {
        AppError::InvalidParameter {
            name,
            reason: format!("has to be smaller than or equal to {}", max),
        }
    }

    pub fn status(&self) -> StatusCode {
        // Clients expect 500 for every error kind.
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = status.as_u16(), error = %self, "request rejected");
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// Failure of a single upstream fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("failed to send request: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    /// JSON-RPC `error.message` from the upstream service.
    #[error("upstream error: {0}")]
    Api(String),

    #[error("upstream response carried neither result nor error")]
    MissingResult,

    #[error("expected {expected} integers, upstream returned {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("upstream value {value} outside {min}..={max}")]
    OutOfRange { value: i64, min: i64, max: i64 },

    /// The fetch task ended without producing an outcome (panic or shutdown).
    #[error("fetch task aborted: {0}")]
    Aborted(String),
}
