//! Metrics helper structs for convenient metric recording

use std::time::Instant;

use prometheus::{Encoder, TextEncoder};

use super::{INVALID_PLACEHOLDERS_TOTAL, OPERATIONS_TOTAL, OPERATION_LATENCY, VARIABLES_EXTRACTED};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording content operation metrics
pub struct ContentMetrics;

impl ContentMetrics {
    pub fn record_success(operation: &str) {
        OPERATIONS_TOTAL.with_label_values(&[operation, "ok"]).inc();
    }

    pub fn record_failure(operation: &str) {
        OPERATIONS_TOTAL.with_label_values(&[operation, "error"]).inc();
    }

    /// Record the number of distinct variables returned by an extraction
    pub fn record_variables(count: usize) {
        VARIABLES_EXTRACTED.observe(count as f64);
    }

    pub fn record_invalid_placeholders(operation: &str, count: usize) {
        if count > 0 {
            INVALID_PLACEHOLDERS_TOTAL
                .with_label_values(&[operation])
                .inc_by(count as u64);
        }
    }
}

/// Observes operation latency when finished
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Record latency and outcome for a finished operation
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        OPERATION_LATENCY
            .with_label_values(&[self.operation])
            .observe(self.start.elapsed().as_secs_f64());

        match result {
            Ok(_) => ContentMetrics::record_success(self.operation),
            Err(_) => ContentMetrics::record_failure(self.operation),
        }
    }
}
