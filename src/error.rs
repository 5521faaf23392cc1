//! Error taxonomy for prompt-relay.
//!
//! Two layers:
//! - [`GenerationError`]: failures talking to the generation provider.
//! - [`ApiError`]: everything a handler can return to an HTTP client,
//!   with its status code and JSON body shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Failure of an outbound generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The provider could not be reached or returned a transport error.
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    /// The provider's response body did not have the expected shape.
    #[error("unexpected provider response: {0}")]
    Malformed(String),

    /// The call did not complete within the configured timeout.
    #[error("generation timed out after {0}s")]
    Timeout(u64),

    /// An operation's template referenced a variable it never declared.
    #[error("prompt rendering failed: {0}")]
    Template(#[from] crate::prompt::MissingVariable),
}

/// One field-level validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending declared input field.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

/// Error response surface of the HTTP API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One or more declared input fields are missing or empty.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// The generation call failed before any output was streamed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The client exceeded its request budget for the current window.
    #[error("too many requests")]
    RateLimited,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "errors": errors })),
            )
                .into_response(),
            ApiError::Generation(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response(),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({ "error": "too many requests" })),
            )
                .into_response(),
        }
    }
}
