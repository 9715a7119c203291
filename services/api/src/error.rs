//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, plus the
//! centralized translation of errors into the uniform response envelope.

use crate::config::ConfigError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use storygen_core::ports::PortError;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("{0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The uniform error body: `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Port(PortError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Port(PortError::MissingToken) | ApiError::Port(PortError::InvalidToken) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to show the caller. Port errors carry
    /// user-facing text, except database failures, which embed raw driver
    /// detail and are sanitized here; everything else collapses to a
    /// generic line.
    fn public_message(&self) -> String {
        match self {
            ApiError::Port(PortError::Database(_)) | ApiError::Database(_) => {
                "Database operation failed. Please try again.".to_string()
            }
            ApiError::Port(port) => port.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

/// A `Json` body extractor whose rejection is translated through `ApiError`,
/// so malformed request bodies get the uniform envelope rather than axum's
/// plain-text rejection.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| PortError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // The full detail goes to the log, never into the body.
        if status.is_server_error() {
            error!("request failed: {:?}", self);
        }
        (status, Json(ErrorBody::new(self.public_message()))).into_response()
    }
}
