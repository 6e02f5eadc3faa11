//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): requests by method, status, route
//! - `dispatch_request_duration_seconds` (histogram): dispatch latency
//! - `remote_calls_total` (counter): outbound overload calls by method, status
//! - `remote_call_duration_seconds` (histogram): outbound call latency
//!
//! Status `0` on a remote call means the transport failed before any
//! response arrived.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", route.to_string()),
    ];
    metrics::counter!("dispatch_requests_total", &labels).increment(1);
    metrics::histogram!("dispatch_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record one outbound call made by a remote overload.
pub fn record_remote_call(method: &str, status: u16, start: Instant) {
    let labels = [("method", method.to_string()), ("status", status.to_string())];
    metrics::counter!("remote_calls_total", &labels).increment(1);
    metrics::histogram!("remote_call_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}
