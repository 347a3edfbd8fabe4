//! # Application Error Types
//!
//! This module defines common error types used throughout the physique-needs application.
//! It provides structured error handling for the parsing pipeline, the catalog and the log store.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Validation errors (meal text, targets, inputs)
    Validation(String),
    /// Database operation errors
    Database(String),
    /// The food catalog could not be consulted at all
    CatalogUnavailable(String),
    /// File system errors
    FileSystem(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Database(msg) => write!(f, "[DATABASE] {}", msg),
            AppError::CatalogUnavailable(msg) => write!(f, "[CATALOG] {}", msg),
            AppError::FileSystem(msg) => write!(f, "[FILESYSTEM] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileSystem(err.to_string())
    }
}

impl From<crate::catalog::CatalogError> for AppError {
    fn from(err: crate::catalog::CatalogError) -> Self {
        AppError::CatalogUnavailable(err.to_string())
    }
}

impl AppError {
    /// Whether this error reports a catalog dependency outage
    pub fn is_catalog_unavailable(&self) -> bool {
        matches!(self, AppError::CatalogUnavailable(_))
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::error;

    /// Log database operation errors with contextual information
    pub fn log_database_error(
        error: &impl std::fmt::Display,
        operation: &str,
        user_id: Option<i64>,
        additional_context: Option<&[(&str, &dyn std::fmt::Display)]>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            user_id = ?user_id,
            additional_context = ?additional_context.map(|ctx| ctx.iter().map(|(k,v)| format!("{}={}", k, v)).collect::<Vec<_>>().join(", ")),
            "Database operation failed"
        );
    }

    /// Log catalog lookup failures with the food token being resolved
    pub fn log_catalog_error(error: &impl std::fmt::Display, operation: &str, food: &str) {
        error!(
            error = %error,
            operation = %operation,
            food = %food,
            "Food catalog lookup failed"
        );
    }

    /// Log validation errors with input context
    pub fn log_validation_error(
        error: &impl std::fmt::Display,
        operation: &str,
        user_id: Option<i64>,
        input_type: &str,
        input_value: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            user_id = ?user_id,
            input_type = %input_type,
            input_value = ?input_value.map(|v| if v.chars().count() > 100 { format!("{}...", v.chars().take(100).collect::<String>()) } else { v.to_string() }),
            "Validation failed"
        );
    }

    /// Log file system errors with path and operation context
    pub fn log_filesystem_error(error: &impl std::fmt::Display, operation: &str, path: Option<&str>) {
        error!(
            error = %error,
            operation = %operation,
            path = ?path,
            "File system operation failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(AppError::Config("x".into()).to_string(), "[CONFIG] x");
        assert_eq!(
            AppError::CatalogUnavailable("down".into()).to_string(),
            "[CATALOG] down"
        );
        assert_eq!(AppError::Validation("empty".into()).to_string(), "[VALIDATION] empty");
    }

    #[test]
    fn test_catalog_error_is_distinguishable() {
        let err: AppError = crate::catalog::CatalogError::new("connection refused").into();
        assert!(err.is_catalog_unavailable());
        assert!(!AppError::Database("boom".into()).is_catalog_unavailable());
    }

    #[test]
    fn test_io_error_maps_to_filesystem() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        assert!(matches!(AppError::from(io), AppError::FileSystem(_)));
    }
}
