//! Observability module for centralized metrics and logging setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Metrics collection with an in-process Prometheus recorder
//! - Span helpers for database work

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::observability_config::ObservabilityConfig;

pub mod metrics;
pub mod tracing_mod;

pub use self::metrics::{
    init_metrics, record_aggregation_metrics, record_catalog_missing_row, record_db_metrics,
    record_recognition, record_text_processing_metrics,
};
pub use self::tracing_mod::{db_span, init_tracing};

/// Initialize logging and, when enabled, the metrics recorder
///
/// Returns the Prometheus handle so callers can render a snapshot on demand.
pub fn init_observability(config: &ObservabilityConfig) -> Result<Option<PrometheusHandle>> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    init_tracing(config)?;

    let handle = if config.enable_metrics {
        Some(init_metrics()?)
    } else {
        None
    };

    tracing::info!(
        environment = %config.environment,
        metrics_enabled = config.enable_metrics,
        "Observability stack initialized successfully"
    );
    Ok(handle)
}
