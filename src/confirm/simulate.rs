//! Pre-flight simulation.
//!
//! Simulation is advisory and fails open: if the simulation itself cannot be
//! run, the transaction is reported as passing and the real submission is
//! the authoritative check.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::confirm::outcome::render_error;
use crate::observability::metrics;
use crate::rpc::client::SolanaRpc;
use crate::rpc::types::{Commitment, SimulateOptions};
use crate::tx::transaction::TransactionExt;
use crate::tx::Transaction;

pub const DEFAULT_LOG_TAIL: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub logs: Vec<String>,
}

impl SimulationOutcome {
    fn passed(logs: Vec<String>) -> Self {
        Self {
            success: true,
            error: None,
            logs,
        }
    }
}

/// Simulate `transaction` against current state. Never fails.
///
/// A transaction with a fee payer is simulated with its blockhash replaced,
/// so neither an expired nor a missing blockhash fails the simulation. One
/// without a fee payer gets a standard simulation.
pub async fn simulate_transaction(
    rpc: &dyn SolanaRpc,
    transaction: &Transaction,
    commitment: Commitment,
    log_tail: usize,
) -> SimulationOutcome {
    let replace_recent_blockhash = transaction.fee_payer().is_some();
    if replace_recent_blockhash && !transaction.has_recent_blockhash() {
        debug!("Simulating with a placeholder blockhash");
    }

    let options = SimulateOptions {
        commitment,
        replace_recent_blockhash,
        // The node rejects sigVerify together with blockhash replacement.
        sig_verify: false,
    };

    let value = match rpc.simulate_transaction(transaction, options).await {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Simulation unavailable, proceeding without it");
            metrics::record_simulation("skipped");
            return SimulationOutcome::passed(Vec::new());
        }
    };

    let logs = value.logs.unwrap_or_default();
    let tail = log_tail_of(&logs, log_tail);

    match value.err {
        Some(err) => {
            let error = render_error(&err);
            warn!(
                error = %error,
                units_consumed = value.units_consumed,
                logs = ?tail,
                "Simulation reported an error"
            );
            metrics::record_simulation("error");
            SimulationOutcome {
                success: false,
                error: Some(error),
                logs,
            }
        }
        None => {
            info!(
                units_consumed = value.units_consumed,
                logs = ?tail,
                "Simulation succeeded"
            );
            metrics::record_simulation("success");
            SimulationOutcome::passed(logs)
        }
    }
}

/// Last `n` log lines.
fn log_tail_of(logs: &[String], n: usize) -> &[String] {
    &logs[logs.len().saturating_sub(n)..]
}
