//! Handler-level error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures a page handler cannot turn into a rendered page of its own.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("template rendering failed: {0}")]
    Render(#[from] tera::Error),

    #[error("session store failure: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details go to the log only.
        tracing::error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
