//! Error types for the Pheme feedback service
//!
//! This module provides structured error handling using thiserror for
//! error definitions and anyhow for propagation at the binary edges.

use crate::validate::ValidationError;
use thiserror::Error;

/// Main error type for Pheme operations
#[derive(Error, Debug)]
pub enum PhemeError {
    /// Submission rejected by the validator (client-caused, maps to 400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database operation failed (server-caused, maps to 500)
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid listen address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Pheme operations
pub type Result<T> = std::result::Result<T, PhemeError>;

impl From<rusqlite::Error> for PhemeError {
    fn from(err: rusqlite::Error) -> Self {
        PhemeError::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PhemeError {
    fn from(err: anyhow::Error) -> Self {
        PhemeError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PhemeError::Database("disk I/O error".to_string());
        assert_eq!(err.to_string(), "Database error: disk I/O error");
    }

    #[test]
    fn test_validation_error_passthrough() {
        let err: PhemeError = ValidationError::InvalidEmail.into();
        assert_eq!(err.to_string(), "Invalid email format");
        assert!(matches!(err, PhemeError::Validation(_)));
    }
}
