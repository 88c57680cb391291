//! Confirmation with exponential backoff.
//!
//! Each attempt races the node client's own `confirm_transaction` against a
//! sub-timeout. Prefer [`Confirmer::wait_for_transaction`]; this path is
//! lower latency but less tolerant of RPC inconsistency.

use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::confirm::outcome::{render_error, ConfirmError, ConfirmResult};
use crate::confirm::poll::Confirmer;
use crate::observability::metrics;
use crate::rpc::types::{Commitment, RpcError, Signature};

/// Delay before retry `attempt` (1-based): `min(base * 2^(attempt-1), max)`.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);

    Duration::from_millis(delay_ms.min(max_ms))
}

impl Confirmer {
    /// Confirm `signature` in up to `max_attempts` attempts within `total_timeout`.
    pub async fn confirm_with_retry(
        &self,
        signature: &Signature,
        commitment: Commitment,
        max_attempts: u32,
        total_timeout: Duration,
    ) -> ConfirmResult {
        let span = tracing::info_span!(
            "confirm_with_retry",
            session = %Uuid::new_v4(),
            signature = %signature,
        );
        self.retry_until(signature, commitment, max_attempts.max(1), total_timeout)
            .instrument(span)
            .await
    }

    /// [`Confirmer::confirm_with_retry`] with the configured attempts and budget.
    pub async fn confirm(&self, signature: &Signature) -> ConfirmResult {
        self.confirm_with_retry(
            signature,
            self.confirmation.commitment,
            self.retry.max_attempts,
            self.retry.total_timeout(),
        )
        .await
    }

    async fn retry_until(
        &self,
        signature: &Signature,
        commitment: Commitment,
        max_attempts: u32,
        total_timeout: Duration,
    ) -> ConfirmResult {
        let start = Instant::now();

        for attempt in 1..=max_attempts {
            let elapsed = start.elapsed();
            if elapsed >= total_timeout {
                break;
            }

            let attempt_timeout = (total_timeout - elapsed).min(self.retry.attempt_timeout());
            info!(
                attempt,
                max_attempts,
                attempt_timeout_ms = attempt_timeout.as_millis() as u64,
                "Confirmation attempt"
            );

            let failure = match timeout(attempt_timeout, self.attempt(signature, commitment)).await {
                Ok(Ok(None)) => {
                    info!(
                        attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Transaction confirmed"
                    );
                    metrics::record_confirmation("success", start.elapsed());
                    return Ok(());
                }
                Ok(Ok(Some(err))) => {
                    let err = render_error(&err);
                    error!(
                        attempt,
                        error = %err,
                        explorer_url = %self.explorer.tx_url(signature),
                        "Transaction failed on-chain"
                    );
                    metrics::record_confirmation("failed", start.elapsed());
                    return Err(ConfirmError::OnChainFailure(err));
                }
                Ok(Err(e)) => ConfirmError::from(e),
                Err(_) => ConfirmError::Timeout {
                    signature: *signature,
                    timeout_ms: attempt_timeout.as_millis() as u64,
                },
            };

            if attempt == max_attempts {
                error!(
                    attempts = attempt,
                    error = %failure,
                    explorer_url = %self.explorer.tx_url(signature),
                    "Confirmation attempts exhausted"
                );
                metrics::record_confirmation("exhausted", start.elapsed());
                return Err(ConfirmError::Exhausted {
                    attempts: attempt,
                    last_error: Box::new(failure),
                });
            }

            let delay = calculate_backoff(attempt, self.retry.base_delay_ms, self.retry.max_delay_ms);
            warn!(
                attempt,
                error = %failure,
                delay_ms = delay.as_millis() as u64,
                "Confirmation attempt failed, backing off"
            );
            sleep(delay).await;
        }

        warn!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            explorer_url = %self.explorer.tx_url(signature),
            "Confirmation budget exhausted"
        );
        metrics::record_confirmation("timeout", start.elapsed());
        Err(ConfirmError::Timeout {
            signature: *signature,
            timeout_ms: total_timeout.as_millis() as u64,
        })
    }

    /// Fresh blockhash context, then the node client's own wait.
    async fn attempt(
        &self,
        signature: &Signature,
        commitment: Commitment,
    ) -> Result<Option<serde_json::Value>, RpcError> {
        let blockhash = self.rpc.get_latest_blockhash(commitment).await?;
        self.rpc
            .confirm_transaction(signature, &blockhash, commitment)
            .await
    }
}
