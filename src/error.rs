// src/error.rs

//! Unified error handling for the lottery application.

use std::fmt;

use thiserror::Error;

/// Result type alias for lottery operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Object missing from storage
    #[error("Not found: {0}")]
    NotFound(String),

    /// No collectible name starts with the season letter
    #[error("No collectible name starts with '{letter}'")]
    EmptyNamePool { letter: char },

    /// Token rejected by the validator
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Relational store failure
    #[error("Database error: {0}")]
    Database(String),

    /// Email delivery failure
    #[error("Mail error: {0}")]
    Mail(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error for a storage location.
    pub fn not_found(location: impl Into<String>) -> Self {
        Self::NotFound(location.into())
    }

    /// Create an authentication error.
    pub fn authentication(message: impl fmt::Display) -> Self {
        Self::Authentication(message.to_string())
    }

    /// Create a database error.
    pub fn database(message: impl fmt::Display) -> Self {
        Self::Database(message.to_string())
    }

    /// Create a mail delivery error.
    pub fn mail(message: impl fmt::Display) -> Self {
        Self::Mail(message.to_string())
    }

    /// Whether this error stems from configuration rather than I/O.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Validation(_) | Self::EmptyNamePool { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_pool_mentions_letter() {
        let err = AppError::EmptyNamePool { letter: 'D' };
        assert_eq!(err.to_string(), "No collectible name starts with 'D'");
        assert!(err.is_configuration());
    }

    #[test]
    fn store_errors_are_not_configuration() {
        assert!(!AppError::database("connection reset").is_configuration());
        assert!(!AppError::not_found("s3://bucket/key").is_configuration());
    }
}
