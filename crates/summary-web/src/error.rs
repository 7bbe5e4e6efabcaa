//! Error types for the summary web service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use summarizer::BuildError;
use summary_core::DateError;
use thiserror::Error;

/// Errors that can occur while serving a request.
#[derive(Debug, Error)]
pub enum WebError {
    /// Malformed query parameter.
    #[error("{0}")]
    Validation(String),

    /// Sign-in required and no identity header present.
    #[error("Unauthorized")]
    Unauthorized,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Summary build failed.
    #[error("{0}")]
    Build(#[from] BuildError),
}

impl From<DateError> for WebError {
    fn from(err: DateError) -> Self {
        WebError::Validation(err.to_string())
    }
}

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            WebError::Validation(_) => StatusCode::BAD_REQUEST,
            WebError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebError::Database(_) | WebError::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for request handlers.
pub type Result<T> = std::result::Result<T, WebError>;
