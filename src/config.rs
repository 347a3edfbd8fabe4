//! # Unified Application Configuration
//!
//! This module provides a centralized configuration system that consolidates
//! all application settings into a single, structured configuration object.
//! It supports loading from environment variables, validation, and provides
//! a clean interface for accessing configuration throughout the application.

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use crate::recognition::DEFAULT_SUGGESTION_LIMIT;
use crate::validation::DEFAULT_MAX_MEAL_TEXT_CHARS;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Meal-text parser settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Maximum number of suggestions attached to an unrecognized food
    pub suggestion_limit: usize,
    /// Maximum accepted meal text length, in characters
    pub max_meal_text_chars: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            max_meal_text_chars: DEFAULT_MAX_MEAL_TEXT_CHARS,
        }
    }
}

impl ParserConfig {
    /// Validate parser configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.suggestion_limit == 0 || self.suggestion_limit > 50 {
            return Err(AppError::Config(
                "suggestion_limit must be between 1 and 50".to_string(),
            ));
        }

        if self.max_meal_text_chars == 0 || self.max_meal_text_chars > 10000 {
            return Err(AppError::Config(
                "max_meal_text_chars must be between 1 and 10000".to_string(),
            ));
        }

        Ok(())
    }
}

/// Database configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; the store is optional for parse-only commands
    pub url: Option<String>,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> AppResult<()> {
        if let Some(url) = &self.url {
            if url.trim().is_empty() {
                return Err(AppError::Config("Database URL cannot be empty".to_string()));
            }

            // Basic PostgreSQL URL validation
            if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                return Err(AppError::Config(
                    "Database URL must start with 'postgresql://' or 'postgres://'".to_string(),
                ));
            }

            let url_parts: Vec<&str> = url.split("://").collect();
            if url_parts.len() != 2 || !url_parts[1].contains('@') {
                return Err(AppError::Config(
                    "Database URL must contain authentication information".to_string(),
                ));
            }
        }

        if self.max_connections == 0 {
            return Err(AppError::Config("Max connections cannot be 0".to_string()));
        }

        if self.max_connections > 100 {
            return Err(AppError::Config(
                "Max connections cannot be greater than 100".to_string(),
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(AppError::Config(
                "Min connections cannot be greater than max connections".to_string(),
            ));
        }

        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 300 {
            return Err(AppError::Config(
                "Connect timeout must be between 1 and 300 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

/// Unified application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Database configuration
    pub database: DatabaseConfig,
    /// Parser configuration
    pub parser: ParserConfig,
    /// Observability configuration
    pub observability: ObservabilityConfig,
    /// Explicit seed catalog path, if any
    pub catalog_path: Option<String>,
}

fn env_or<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a valid number", key))),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", defaults.database.max_connections)?,
            min_connections: env_or("DATABASE_MIN_CONNECTIONS", defaults.database.min_connections)?,
            connect_timeout_secs: env_or(
                "DATABASE_CONNECT_TIMEOUT_SECS",
                defaults.database.connect_timeout_secs,
            )?,
        };

        let parser = ParserConfig {
            suggestion_limit: env_or("SUGGESTION_LIMIT", defaults.parser.suggestion_limit)?,
            max_meal_text_chars: env_or("MAX_MEAL_TEXT_CHARS", defaults.parser.max_meal_text_chars)?,
        };

        Ok(Self {
            database,
            parser,
            observability: ObservabilityConfig::from_env(),
            catalog_path: env::var("FOOD_CATALOG_PATH").ok(),
        })
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.database.validate()?;
        self.parser.validate()?;
        self.observability.validate()?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: db_url={}, suggestion_limit={}, max_meal_text_chars={}, environment={}, metrics_enabled={}",
            if self.database.url.is_some() { "[REDACTED]" } else { "<none>" },
            self.parser.suggestion_limit,
            self.parser.max_meal_text_chars,
            self.observability.environment,
            self.observability.enable_metrics
        )
    }
}
