//! Metrics collection and exposition.
//!
//! # Metrics
//! - `telephone_messages_received_total` (counter): envelopes accepted, by hop kind
//! - `telephone_mutations_total` (counter): transform outcomes
//! - `telephone_backend_calls_total` (counter): backend calls by backend and outcome
//! - `telephone_health_probes_total` (counter): probes by host and result
//! - `telephone_forwards_total` (counter): detached forwards by outcome
//! - `telephone_forwards_in_flight` (gauge): detached forwards not yet finished
//! - `telephone_chains_completed_total` (counter): hops that ended a chain
//! - `telephone_request_duration_seconds` (histogram): handler latency
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const MESSAGES_RECEIVED: &str = "telephone_messages_received_total";
pub const MUTATIONS: &str = "telephone_mutations_total";
pub const BACKEND_CALLS: &str = "telephone_backend_calls_total";
pub const HEALTH_PROBES: &str = "telephone_health_probes_total";
pub const FORWARDS: &str = "telephone_forwards_total";
pub const FORWARDS_IN_FLIGHT: &str = "telephone_forwards_in_flight";
pub const CHAINS_COMPLETED: &str = "telephone_chains_completed_total";
pub const REQUEST_DURATION: &str = "telephone_request_duration_seconds";

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_message_received(hop: &'static str) {
    metrics::counter!(MESSAGES_RECEIVED, "hop" => hop).increment(1);
}

pub fn record_mutation(outcome: &'static str) {
    metrics::counter!(MUTATIONS, "outcome" => outcome).increment(1);
}

pub fn record_backend_call(backend: &'static str, success: bool) {
    metrics::counter!(
        BACKEND_CALLS,
        "backend" => backend,
        "outcome" => outcome_label(success)
    )
    .increment(1);
}

pub fn record_health_probe(host: &str, healthy: bool) {
    metrics::counter!(
        HEALTH_PROBES,
        "host" => host.to_owned(),
        "healthy" => if healthy { "true" } else { "false" }
    )
    .increment(1);
}

pub fn record_forward(outcome: &'static str) {
    metrics::counter!(FORWARDS, "outcome" => outcome).increment(1);
}

pub fn set_forwards_in_flight(count: usize) {
    metrics::gauge!(FORWARDS_IN_FLIGHT).set(count as f64);
}

pub fn record_chain_completed() {
    metrics::counter!(CHAINS_COMPLETED).increment(1);
}

pub fn record_request_duration(seconds: f64) {
    metrics::histogram!(REQUEST_DURATION).record(seconds);
}

fn outcome_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}
