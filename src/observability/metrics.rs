//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_resolutions_total` (counter): resolutions by route, `outcome`=matched|not_found
//! - `proxy_requests_total` (counter): proxied requests by prefix, status
//! - `proxy_request_duration_seconds` (histogram): upstream latency by prefix
//! - `shell_requests_total` (counter): client-route page loads by route, status

use std::net::{AddrParseError, SocketAddr};
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use thiserror::Error;

/// Errors raised while installing the exporter.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid metrics address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to install metrics exporter: {0}")]
    Exporter(#[from] BuildError),
}

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(address: &str) -> Result<SocketAddr, MetricsError> {
    let addr: SocketAddr = address.parse().map_err(|source| MetricsError::Address {
        address: address.to_string(),
        source,
    })?;
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(addr)
}

/// Record one resolution. `None` means nothing matched.
pub fn record_resolution(route: Option<&str>) {
    let (route, outcome) = match route {
        Some(name) => (name.to_string(), "matched"),
        None => ("none".to_string(), "not_found"),
    };
    counter!("router_resolutions_total", "route" => route, "outcome" => outcome).increment(1);
}

/// Record one proxied request.
pub fn record_proxy(prefix: &str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "prefix" => prefix.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "prefix" => prefix.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one page load answered with the application shell or a 404 page.
pub fn record_shell(route: &str, status: u16) {
    counter!(
        "shell_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
