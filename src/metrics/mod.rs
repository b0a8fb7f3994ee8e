//! Prometheus metrics for the content service.
//!
//! - Operation counts per endpoint, split by outcome
//! - Operation latency
//! - Variables extracted per request

mod helpers;

pub use helpers::{encode_metrics, ContentMetrics, OperationTimer};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Histogram, HistogramVec,
    IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "elemental";

lazy_static! {
    /// Content operations handled, by operation and outcome
    pub static ref OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_operations_total", METRIC_PREFIX),
        "Total content operations handled",
        &["operation", "outcome"]
    ).unwrap();

    /// Operation latency in seconds
    pub static ref OPERATION_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_operation_latency_seconds", METRIC_PREFIX),
        "Content operation latency in seconds",
        &["operation"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]
    ).unwrap();

    /// Distinct variables found per extraction request
    pub static ref VARIABLES_EXTRACTED: Histogram = register_histogram!(
        format!("{}_variables_extracted", METRIC_PREFIX),
        "Distinct variables found per extraction request",
        vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]
    ).unwrap();

    /// Invalid placeholders reported by parse requests
    pub static ref INVALID_PLACEHOLDERS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_invalid_placeholders_total", METRIC_PREFIX),
        "Invalid placeholders found while parsing text",
        &["operation"]
    ).unwrap();
}
