//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, route
//! - `proxy_request_duration_seconds` (histogram): latency by route
//! - `proxy_dedup_decisions_total` (counter): filter outcomes by record type

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
///
/// Failure to install is logged and the proxy keeps serving without an
/// exposition endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "proxy_requests_total",
                "Total requests handled, by method, status and route"
            );
            describe_histogram!(
                "proxy_request_duration_seconds",
                "Request latency in seconds, by route"
            );
            describe_counter!(
                "proxy_dedup_decisions_total",
                "Admission filter outcomes, by record type and decision"
            );
            tracing::info!(address = %addr, "metrics endpoint started");
        }
        Err(error) => {
            tracing::error!(%error, address = %addr, "failed to start metrics endpoint");
        }
    }
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record one admission filter outcome.
pub fn record_decision(record_type: &str, dropped: bool) {
    counter!(
        "proxy_dedup_decisions_total",
        "type" => record_type.to_string(),
        "decision" => if dropped { "drop" } else { "forward" }
    )
    .increment(1);
}
