//! Metrics collection and exposition.
//!
//! # Metrics
//! - `avatar_requests_total` (counter): requests by status and served format
//! - `avatar_request_duration_seconds` (histogram): end-to-end latency
//!
//! Recording goes through the `metrics` facade and is a no-op until an
//! exporter is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Record one finished avatar request. `format` is `png`, `svg` or `none`.
pub fn record_request(status: u16, format: &'static str, start_time: Instant) {
    let status = status.to_string();

    metrics::counter!("avatar_requests_total", "status" => status.clone(), "format" => format)
        .increment(1);
    metrics::histogram!("avatar_request_duration_seconds", "status" => status, "format" => format)
        .record(start_time.elapsed().as_secs_f64());
}

/// Install the Prometheus exporter serving `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}
