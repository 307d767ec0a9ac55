//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// Every operation in the core fails fast with one of these before any
/// counter or ledger row is touched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Referenced resource does not resolve (stock item, ledger scope)
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// Input rejected before any mutation was applied
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The atomic primitive kept reporting a conflict after all retries
    #[error("Conflict under concurrency: {scope}")]
    ConflictUnderConcurrency { scope: String },
}

impl DomainError {
    /// Create a not-found error
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::InvalidArgument(_))
    }

    /// Check if this is a conflict error (retry may help)
    pub fn is_conflict_error(&self) -> bool {
        matches!(self, Self::ConflictUnderConcurrency { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("Stock item", "abc");

        assert!(err.is_client_error());
        assert!(!err.is_conflict_error());
        assert_eq!(err.to_string(), "Stock item not found: abc");
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = DomainError::invalid("issued must not be negative");

        assert!(err.is_client_error());
        assert!(err.to_string().contains("issued must not be negative"));
    }

    #[test]
    fn test_conflict_error() {
        let err = DomainError::ConflictUnderConcurrency {
            scope: "counter".to_string(),
        };

        assert!(!err.is_client_error());
        assert!(err.is_conflict_error());
    }
}
