//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gopen_requests_total` (counter): endpoint responses by endpoint, method, status
//! - `gopen_request_duration_seconds` (histogram): endpoint latency
//! - `gopen_backend_calls_total` (counter): backend calls by backend, status
//! - `gopen_cache_lookups_total` (counter): cache reads by result
//! - `gopen_rate_limited_total` (counter): requests rejected by the limiter

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "failed to install metrics exporter"),
    }
}

pub fn record_request(endpoint: &str, method: &str, status: u16, start: Instant) {
    counter!(
        "gopen_requests_total",
        "endpoint" => endpoint.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gopen_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_call(backend: &str, status: u16) {
    counter!(
        "gopen_backend_calls_total",
        "backend" => backend.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("gopen_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_rate_limited(reason: &'static str) {
    counter!("gopen_rate_limited_total", "reason" => reason).increment(1);
}
