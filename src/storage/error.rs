//! Storage Errors
//!
//! Error types shared by every store implementation.

/// SQLSTATE codes that mean "the same statement may succeed if retried"
const RETRYABLE_SQLSTATES: &[&str] = &[
    "40001", // serialization_failure
    "40P01", // deadlock_detected
];

/// Errors that can occur in a store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The atomic primitive reported a conflict; the operation may be retried
    #[error("Concurrent update conflict on {0}")]
    Conflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored row failed to decode into a domain value
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(code) = db_err.code() {
                let code: &str = &code;
                if RETRYABLE_SQLSTATES.contains(&code) {
                    return StoreError::Conflict(format!("sqlstate {code}"));
                }
            }
        }
        StoreError::Database(err)
    }
}
