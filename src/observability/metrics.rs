//! Metrics collection and exposition.
//!
//! # Metrics
//! - `log_records_total` (counter): records delivered, by level and subsystem
//! - `correlation_ids_total` (counter): identifiers resolved, by source
//! - `log_level_changes_total` (counter): threshold changes, by subsystem
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::logging::Severity;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_log_emitted(level: Severity, subsystem: &str) {
    counter!(
        "log_records_total",
        "level" => level.as_str(),
        "subsystem" => subsystem.to_string()
    )
    .increment(1);
}

pub fn record_correlation_id(source: &'static str) {
    counter!("correlation_ids_total", "source" => source).increment(1);
}

pub fn record_level_change(subsystem: &str) {
    counter!("log_level_changes_total", "subsystem" => subsystem.to_string()).increment(1);
}
