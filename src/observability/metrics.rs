//! Metrics collection.
//!
//! # Metrics
//! - `influx_pool_attempts_total` (counter): attempts by host, outcome
//! - `influx_pool_dispatch_total` (counter): dispatches by final outcome
//! - `influx_pool_attempt_duration_seconds` (histogram): per-attempt latency by host
//! - `influx_pool_host_available` (gauge): 1=available, 0=cooling down
//! - `influx_pool_probe_rtt_seconds` (histogram): ping round trip by host
//! - `influx_pool_probe_online` (gauge): 1=answered the last ping, 0=did not
//!
//! # Design Decisions
//! - Labels for host and outcome only; request content never becomes a label
//! - Recording is free when no recorder is installed

use std::time::Duration;

pub fn record_attempt(host: &str, outcome: &'static str) {
    ::metrics::counter!(
        "influx_pool_attempts_total",
        "host" => host.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_attempt_duration(host: &str, elapsed: Duration) {
    ::metrics::histogram!(
        "influx_pool_attempt_duration_seconds",
        "host" => host.to_string()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_dispatch(outcome: &'static str) {
    ::metrics::counter!("influx_pool_dispatch_total", "outcome" => outcome).increment(1);
}

pub fn record_host_available(host: &str, available: bool) {
    ::metrics::gauge!("influx_pool_host_available", "host" => host.to_string())
        .set(if available { 1.0 } else { 0.0 });
}

pub fn record_probe(host: &str, online: bool, rtt: Option<Duration>) {
    ::metrics::gauge!("influx_pool_probe_online", "host" => host.to_string())
        .set(if online { 1.0 } else { 0.0 });
    if let Some(rtt) = rtt {
        ::metrics::histogram!("influx_pool_probe_rtt_seconds", "host" => host.to_string())
            .record(rtt.as_secs_f64());
    }
}
