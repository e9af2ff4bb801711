//! Gateway error types with HTTP status code mapping.
//!
//! [`ChatError`] is the central error type for the gateway. Each variant
//! maps to an HTTP status code and a flat JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::MessageId;

/// JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// { "error": "message not found: m1" }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// Taxonomy: validation and persistence failures surface as 400, a missing
/// message as 404, an author mismatch on edit/delete as 403. Nothing is
/// retried; realtime delivery failures never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Request validation failed (missing or malformed required field).
    #[error("{0}")]
    InvalidRequest(String),

    /// The referenced message does not exist.
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// The caller is not the author of the message it tried to mutate.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Persistence layer failure, surfaced with the underlying message.
    #[error("{0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Persistence(_) => StatusCode::BAD_REQUEST,
            Self::MessageNotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ChatError {
    fn from(e: sqlx::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
