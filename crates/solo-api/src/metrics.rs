//! Prometheus metrics for the API server.

use std::sync::OnceLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "solo_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "solo_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "solo_http_requests_in_flight";

    // Marketplace metrics
    pub const BIDS_PLACED_TOTAL: &str = "solo_bids_placed_total";
    pub const BIDS_DUPLICATE_TOTAL: &str = "solo_bids_duplicate_total";
    pub const TOKENS_ISSUED_TOTAL: &str = "solo_tokens_issued_total";
    pub const AUTH_FAILURES_TOTAL: &str = "solo_auth_failures_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a bid accepted.
pub fn record_bid_placed() {
    counter!(names::BIDS_PLACED_TOTAL).increment(1);
}

/// Record a bid rejected as a duplicate.
pub fn record_duplicate_bid() {
    counter!(names::BIDS_DUPLICATE_TOTAL).increment(1);
}

/// Record a session token issued.
pub fn record_token_issued() {
    counter!(names::TOKENS_ISSUED_TOTAL).increment(1);
}

/// Record a rejected token check.
pub fn record_auth_failure(reason: &'static str) {
    let labels = [("reason", reason)];
    counter!(names::AUTH_FAILURES_TOTAL, &labels).increment(1);
}

fn object_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/[0-9a-fA-F]{24}(/|$)").expect("valid regex"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/[^/]*(@|%40)[^/]*").expect("valid regex"))
}

/// Sanitize path for metrics labels (remove ids and e-mail addresses).
fn sanitize_path(path: &str) -> String {
    let path = object_id_pattern().replace_all(path, "/{id}$1");
    let path = email_pattern().replace_all(&path, "/{email}");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/job/65a1b2c3d4e5f6a7b8c9d0e1"), "/job/{id}");
        assert_eq!(
            sanitize_path("/bidStatusUpdate/65A1B2C3D4E5F6A7B8C9D0E1"),
            "/bidStatusUpdate/{id}"
        );
        assert_eq!(sanitize_path("/bids/jane%40example.com"), "/bids/{email}");
        assert_eq!(sanitize_path("/allJobs/jane@example.com"), "/allJobs/{email}");
        assert_eq!(sanitize_path("/allJobsFilter"), "/allJobsFilter");
        assert_eq!(sanitize_path("/"), "/");
    }
}
