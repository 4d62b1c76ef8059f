//! Storage metrics collection.
//!
//! Provides standardized metrics for monitoring database operations:
//! - Request counters by operation and outcome
//! - Latency histograms

use std::future::Future;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug_span, Instrument};

use crate::error::StoreResult;

/// Metric name constants for consistency.
pub mod names {
    /// Total storage operations by operation and outcome.
    pub const REQUESTS_TOTAL: &str = "store_requests_total";

    /// Operation latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "store_latency_seconds";
}

/// Record metrics for a completed storage operation.
pub fn record_request(operation: &str, outcome: &str, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Run a storage operation inside a span and record its outcome and latency.
pub async fn observe<T, F>(operation: &'static str, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    let start = Instant::now();
    let result = fut.instrument(debug_span!("store", operation)).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) if e.is_client_error() => "rejected",
        Err(_) => "error",
    };
    record_request(operation, outcome, start.elapsed().as_secs_f64() * 1000.0);

    result
}
