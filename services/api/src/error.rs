//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for startup and
//! `ServiceError` for everything a request can fail with.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lucidcare_core::{comparison::ComparisonError, ports::PortError};
use serde_json::json;
use tracing::error;

/// The primary error type for starting the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure applying the embedded schema migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The error of every application operation. Each variant maps to one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or malformed input. 400.
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or an invalid/expired token. 401.
    #[error("{0}")]
    Auth(String),

    /// The referenced resource does not exist for this user. 404.
    #[error("{0}")]
    NotFound(String),

    /// The extraction, summarization or comparison capability failed. 502.
    #[error("{0}")]
    Analysis(String),

    /// Anything else. The detail is logged, never returned. 500.
    #[error("Internal server error")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Analysis(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PortError> for ServiceError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(m) => ServiceError::NotFound(m),
            PortError::Conflict(m) => ServiceError::Validation(m),
            PortError::InvalidDocument(m) => ServiceError::Validation(m),
            PortError::Analysis(m) => ServiceError::Analysis(m),
            PortError::Unexpected(m) => ServiceError::Internal(m),
        }
    }
}

impl From<ComparisonError> for ServiceError {
    fn from(e: ComparisonError) -> Self {
        match e {
            ComparisonError::TooFewSummaries => ServiceError::Validation(e.to_string()),
            ComparisonError::MissingSummaries(_) => ServiceError::NotFound(e.to_string()),
            ComparisonError::MissingField(_) | ComparisonError::InvalidField { .. } => {
                ServiceError::Analysis(e.to_string())
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ServiceError::Internal(detail) = &self {
            error!("Internal error: {}", detail);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
