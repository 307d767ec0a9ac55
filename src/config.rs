//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::numbering::DEFAULT_MAX_RETRIES;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Environment (development, production)
    pub environment: String,

    /// Attempts for a conflicting counter increment
    pub allocation_max_retries: u32,

    /// How often the ledger audit job walks every chain
    pub ledger_audit_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let allocation_max_retries: u32 = env::var("ALLOCATION_MAX_RETRIES")
            .unwrap_or_else(|_| DEFAULT_MAX_RETRIES.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("ALLOCATION_MAX_RETRIES"))?;
        if allocation_max_retries == 0 {
            return Err(ConfigError::InvalidValue("ALLOCATION_MAX_RETRIES"));
        }

        let audit_secs: u64 = env::var("LEDGER_AUDIT_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("LEDGER_AUDIT_INTERVAL_SECS"))?;
        if audit_secs == 0 {
            return Err(ConfigError::InvalidValue("LEDGER_AUDIT_INTERVAL_SECS"));
        }

        Ok(Self {
            database_url,
            database_max_connections,
            environment,
            allocation_max_retries,
            ledger_audit_interval: Duration::from_secs(audit_secs),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
