//! Error types for the site API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! response body is always
//! `{"error": "<message>", "kind": "<kind>", "status": <code>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sitegen_core::SiteError;
use tracing::error;

/// Errors that can occur in the site API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body is missing, malformed, or breaks a field constraint.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A site identifier in the path is not a positive integer.
    #[error("invalid site id: {0}")]
    InvalidId(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status code this error is reported with.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error category.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) | Self::InvalidId(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<SiteError> for ApiError {
    fn from(err: SiteError) -> Self {
        match err {
            SiteError::NotFound(id) => Self::NotFound(format!("site {id}")),
            other @ (SiteError::InvalidTransition { .. }
            | SiteError::IdExhausted
            | SiteError::Template(_)) => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::InvalidId(msg)
            | Self::Internal(msg) => msg.clone(),
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": message,
            "kind": self.kind(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
