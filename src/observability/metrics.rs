//! Metrics recording helpers.
//!
//! All helpers write through the `metrics` facade and are no-ops until a
//! recorder is installed.

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize metrics collection with the Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle> {
    let builder = PrometheusBuilder::new();
    let handle = builder.install_recorder()?;

    tracing::info!("Metrics collection initialized");
    Ok(handle)
}

/// Record text processing performance metrics
pub fn record_text_processing_metrics(
    operation: &str,
    duration: std::time::Duration,
    text_length: usize,
    matches_found: usize,
) {
    let operation = operation.to_string();
    metrics::counter!("text_processing_operations_total", "operation" => operation.clone())
        .increment(1);
    metrics::histogram!("text_processing_duration_seconds", "operation" => operation.clone())
        .record(duration.as_secs_f64());
    metrics::histogram!("text_processing_input_length", "operation" => operation.clone())
        .record(text_length as f64);
    metrics::histogram!("text_processing_matches_found", "operation" => operation)
        .record(matches_found as f64);
}

/// Record the outcome of resolving one food token against the catalog
pub fn record_recognition(recognized: bool) {
    metrics::counter!(
        "food_recognition_total",
        "result" => if recognized { "recognized" } else { "unrecognized" }
    )
    .increment(1);
}

/// Record a recognized food whose catalog row vanished before aggregation
pub fn record_catalog_missing_row() {
    metrics::counter!("catalog_missing_rows_total").increment(1);
}

/// Record how many items went into an aggregation and how many contributed
pub fn record_aggregation_metrics(total_items: usize, contributing: usize) {
    metrics::histogram!("nutrient_aggregation_items", "kind" => "total")
        .record(total_items as f64);
    metrics::histogram!("nutrient_aggregation_items", "kind" => "contributing")
        .record(contributing as f64);
}

/// Record database operation metrics
pub fn record_db_metrics(operation: &str, duration: std::time::Duration) {
    let operation = operation.to_string();
    metrics::counter!("db_operations_total", "operation" => operation).increment(1);
    metrics::histogram!("db_operation_duration_seconds").record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_text_processing_metrics("extract_mentions", Duration::from_millis(2), 12, 1);
        record_recognition(true);
        record_recognition(false);
        record_catalog_missing_row();
        record_aggregation_metrics(3, 2);
        record_db_metrics("save_food_log", Duration::from_millis(5));
    }
}
