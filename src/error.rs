//! Error handling module
//!
//! Centralized error type and stable machine codes for the surrounding
//! application to translate into its own responses.

use crate::domain::DomainError;
use crate::storage::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Storage errors
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable error code for callers
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Domain(DomainError::NotFound { .. }) => "not_found",
            AppError::Domain(DomainError::InvalidArgument(_)) => "invalid_argument",
            AppError::Domain(DomainError::ConflictUnderConcurrency { .. }) => "conflict",
            AppError::Store(StoreError::Conflict(_)) => "conflict",
            AppError::Store(_) => "storage_error",
            AppError::Config(_) => "config_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Check if the caller supplied bad input
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Domain(e) if e.is_client_error())
    }

    /// The domain error behind this error, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            AppError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Store(err.into())
    }
}
