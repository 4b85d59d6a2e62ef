//! services/web/src/error.rs
//!
//! Defines the primary error type for the entire web service.

use crate::config::ConfigError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use summarizer_core::ports::PortError;

/// The primary error type for the `web` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a failure while rendering an HTML template.
    #[error("Template Error: {0}")]
    Template(#[from] askama::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Internal Server Error</h1><p>Something went wrong. Please try again later.</p>"),
        )
            .into_response()
    }
}

/// Result type for page handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
