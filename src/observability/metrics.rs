//! Metrics recording.
//!
//! # Metrics
//! - `olivia_tx_confirmations_total` (counter): confirmations by outcome
//! - `olivia_tx_confirmation_duration_seconds` (histogram): time to a verdict, by outcome
//! - `olivia_tx_status_checks_total` (counter): status reads by result
//! - `olivia_rpc_failover_total` (counter): calls answered by a fallback endpoint
//! - `olivia_tx_simulations_total` (counter): simulations by outcome
//!
//! # Design Decisions
//! - No exporter is installed here; the embedding application owns the recorder
//! - Without a recorder every call is a no-op

use std::time::Duration;

pub fn record_confirmation(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("olivia_tx_confirmations_total", "outcome" => outcome).increment(1);
    metrics::histogram!("olivia_tx_confirmation_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}

pub fn record_status_check(result: &'static str) {
    metrics::counter!("olivia_tx_status_checks_total", "result" => result).increment(1);
}

pub fn record_rpc_failover(endpoint: &str) {
    metrics::counter!("olivia_rpc_failover_total", "endpoint" => endpoint.to_string()).increment(1);
}

pub fn record_simulation(outcome: &'static str) {
    metrics::counter!("olivia_tx_simulations_total", "outcome" => outcome).increment(1);
}
