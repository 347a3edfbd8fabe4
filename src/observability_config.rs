//! # Observability Configuration
//!
//! Environment-specific configuration for logging and metrics.

use crate::errors::{AppError, AppResult};
use std::env;

/// Observability configuration for different environments
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityConfig {
    /// Environment name (development, staging, production)
    pub environment: String,
    /// Log level for the crate's own targets
    pub log_level: String,
    /// Log output format: "json" or "pretty"
    pub log_format: String,
    /// Whether to install the Prometheus metrics recorder
    pub enable_metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_format: "json".to_string(),
            enable_metrics: true,
        }
    }
}

impl ObservabilityConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),
            enable_metrics: env::var("ENABLE_METRICS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        }
    }

    /// Check if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Whether logs should be rendered for humans rather than as JSON
    pub fn use_pretty_logs(&self) -> bool {
        self.log_format == "pretty"
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.environment.as_str()) {
            return Err(AppError::Config(format!(
                "Invalid environment '{}'. Must be one of: {:?}",
                self.environment, valid_environments
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "Invalid log level '{}'. Must be one of: {:?}",
                self.log_level, valid_levels
            )));
        }

        if self.log_format != "json" && self.log_format != "pretty" {
            return Err(AppError::Config(format!(
                "Invalid log format '{}'. Must be 'json' or 'pretty'",
                self.log_format
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ObservabilityConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_development());
        assert!(!config.use_pretty_logs());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = ObservabilityConfig {
            environment: "qa".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.environment = "production".to_string();

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
        config.log_level = "DEBUG".to_string();
        assert!(config.validate().is_ok());

        config.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
