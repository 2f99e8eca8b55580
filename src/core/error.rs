//! Typed errors for the HTTP surface.
//!
//! Every handler failure collapses into one of three kinds: a rejected
//! payload (400), a miss on an identifier (404), or a storage fault (500).
//! All of them serialize to the same `{message, error?}` body at the
//! handler boundary; nothing crashes the process.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Payload failed validation: missing required field, wrong body shape,
    /// or an unparseable field value.
    #[error("{0}")]
    Validation(String),

    /// No record answers to the identifier. Malformed identifiers land here
    /// too; they can never name a record.
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// The store operation failed; the driver diagnostic is forwarded to
    /// the caller as `error`.
    #[error("Server error")]
    Storage(#[from] anyhow::Error),
}

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiError {
    /// A 404 for the given resource label (e.g. "Quotation").
    pub fn not_found(resource: &'static str) -> Self {
        ApiError::NotFound { resource }
    }

    /// The HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = match &self {
            ApiError::Storage(e) => Some(e.to_string()),
            _ => None,
        };
        let body = ErrorBody {
            message: self.to_string(),
            error,
        };
        (status, Json(body)).into_response()
    }
}
