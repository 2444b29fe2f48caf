//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lendpage_requests_total` (counter): requests by method, status
//! - `lendpage_request_duration_seconds` (histogram): latency distribution
//! - `lendpage_submissions_total` (counter): form submissions by outcome
//!
//! Outcomes: `created`, `invalid`, `captcha_rejected`, `captcha_unavailable`,
//! `storage_transient`, `storage_permanent`.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, status: u16, start_time: Instant) {
    let status = status.to_string();
    counter!(
        "lendpage_requests_total",
        "method" => method.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "lendpage_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status
    )
    .record(start_time.elapsed().as_secs_f64());
}

/// Record the outcome of a form submission.
pub fn record_submission(outcome: &'static str) {
    counter!("lendpage_submissions_total", "outcome" => outcome).increment(1);
}

/// Middleware recording request count and latency.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), start_time);
    response
}
