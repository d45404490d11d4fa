//! Metrics collection and exposition.
//!
//! # Metrics
//! - `adapter_requests_total` (counter): requests by endpoint, status
//! - `adapter_request_duration_seconds` (histogram): latency by endpoint
//! - `adapter_upstream_calls_total` (counter): upstream calls by action, outcome
//! - `adapter_upstream_duration_seconds` (histogram): upstream latency by action

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::upstream::{TransportResult, UpstreamAction, UpstreamResult};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one handled HTTP request.
pub fn record_request(endpoint: &str, status: u16, start_time: Instant) {
    let endpoint = endpoint.to_string();
    metrics::counter!(
        "adapter_requests_total",
        "endpoint" => endpoint.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("adapter_request_duration_seconds", "endpoint" => endpoint)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record one upstream call and how it ended.
pub fn record_upstream_call(
    action: UpstreamAction,
    outcome: &TransportResult<UpstreamResult>,
    start_time: Instant,
) {
    metrics::counter!(
        "adapter_upstream_calls_total",
        "action" => action.as_str(),
        "outcome" => outcome_label(outcome)
    )
    .increment(1);
    metrics::histogram!("adapter_upstream_duration_seconds", "action" => action.as_str())
        .record(start_time.elapsed().as_secs_f64());
}

fn outcome_label(outcome: &TransportResult<UpstreamResult>) -> &'static str {
    match outcome {
        Ok(result) if result.is_success() => "success",
        Ok(_) => "rejected",
        Err(_) => "transport_error",
    }
}
