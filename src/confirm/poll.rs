//! Bounded poll-loop confirmation.
//!
//! The wall-clock timeout is the only bound; it is checked between
//! attempts, so an in-flight status call may overrun it by its own latency.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::config::{ConfirmationConfig, RelayConfig, RetryConfig};
use crate::confirm::outcome::{ConfirmError, ConfirmResult, StatusCheck};
use crate::confirm::status::check_status_with_fallback;
use crate::diagnostics::Explorer;
use crate::observability::metrics;
use crate::rpc::client::SolanaRpc;
use crate::rpc::types::{Commitment, Signature};

/// Confirms submitted transactions against a commitment level.
///
/// Holds no per-call state; one `Confirmer` can serve any number of
/// concurrent waits.
#[derive(Clone)]
pub struct Confirmer {
    pub(crate) rpc: Arc<dyn SolanaRpc>,
    pub(crate) explorer: Explorer,
    pub(crate) confirmation: ConfirmationConfig,
    pub(crate) retry: RetryConfig,
}

impl Confirmer {
    pub fn new(rpc: Arc<dyn SolanaRpc>, config: &RelayConfig) -> Self {
        Self {
            rpc,
            explorer: Explorer::from_config(config),
            confirmation: config.confirmation.clone(),
            retry: config.retries.clone(),
        }
    }

    pub fn rpc(&self) -> &Arc<dyn SolanaRpc> {
        &self.rpc
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    /// One status check; RPC failures read as `NotFound`.
    pub async fn check_status(&self, signature: &Signature, commitment: Commitment) -> StatusCheck {
        check_status_with_fallback(
            self.rpc.as_ref(),
            &self.explorer,
            signature,
            commitment,
            self.confirmation.search_history,
        )
        .await
    }

    /// [`Confirmer::wait_for_transaction`] with the configured commitment,
    /// timeout and interval.
    pub async fn wait(&self, signature: &Signature) -> ConfirmResult {
        self.wait_for_transaction(
            signature,
            self.confirmation.commitment,
            self.confirmation.timeout(),
            self.confirmation.poll_interval(),
        )
        .await
    }

    /// Poll until `signature` reaches `commitment`, fails on-chain, or
    /// `timeout` elapses.
    pub async fn wait_for_transaction(
        &self,
        signature: &Signature,
        commitment: Commitment,
        timeout: Duration,
        poll_interval: Duration,
    ) -> ConfirmResult {
        let span = tracing::info_span!(
            "wait_for_transaction",
            session = %Uuid::new_v4(),
            signature = %signature,
        );
        self.poll_until(signature, commitment, timeout, poll_interval)
            .instrument(span)
            .await
    }

    async fn poll_until(
        &self,
        signature: &Signature,
        commitment: Commitment,
        timeout: Duration,
        poll_interval: Duration,
    ) -> ConfirmResult {
        let start = Instant::now();
        let mut attempt: u32 = 0;

        info!(
            commitment = %commitment,
            timeout_ms = timeout.as_millis() as u64,
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Waiting for transaction"
        );

        while start.elapsed() < timeout {
            attempt += 1;

            match self.check_status(signature, commitment).await {
                StatusCheck::Success => {
                    info!(
                        attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Transaction confirmed"
                    );
                    metrics::record_confirmation("success", start.elapsed());
                    return Ok(());
                }
                StatusCheck::Failed(err) => {
                    error!(
                        attempt,
                        error = %err,
                        explorer_url = %self.explorer.tx_url(signature),
                        "Transaction failed on-chain"
                    );
                    metrics::record_confirmation("failed", start.elapsed());
                    return Err(ConfirmError::OnChainFailure(err));
                }
                StatusCheck::NotFound => {
                    debug!(
                        attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Transaction not yet confirmed"
                    );
                    sleep(poll_interval).await;
                }
            }
        }

        warn!(
            attempts = attempt,
            elapsed_ms = start.elapsed().as_millis() as u64,
            explorer_url = %self.explorer.tx_url(signature),
            "Transaction confirmation timed out"
        );
        metrics::record_confirmation("timeout", start.elapsed());

        Err(ConfirmError::Timeout {
            signature: *signature,
            timeout_ms: timeout.as_millis() as u64,
        })
    }
}

impl std::fmt::Debug for Confirmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Confirmer")
            .field("explorer", &self.explorer)
            .field("confirmation", &self.confirmation)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::{status, transport_error, MockRpc};
    use serde_json::json;

    fn confirmer(rpc: MockRpc) -> (Confirmer, Arc<MockRpc>) {
        let rpc = Arc::new(rpc);
        (Confirmer::new(rpc.clone(), &RelayConfig::default()), rpc)
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_after_pending_poll() {
        let (confirmer, rpc) = confirmer(MockRpc::new().with_statuses(vec![
            Ok(None),
            Ok(Some(status(Some(Commitment::Confirmed), None))),
        ]));

        let start = Instant::now();
        let result = confirmer
            .wait_for_transaction(
                &Signature::new_unique(),
                Commitment::Confirmed,
                Duration::from_millis(90_000),
                Duration::from_millis(2_000),
            )
            .await;

        assert_eq!(result, Ok(()));
        assert!(start.elapsed() >= Duration::from_millis(2_000));
        assert!(start.elapsed() < Duration::from_millis(3_000));
        assert_eq!(rpc.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_chain_failure_is_immediate() {
        let err = json!({"InstructionError": [0, "Custom"]});
        let (confirmer, rpc) = confirmer(
            MockRpc::new().with_statuses(vec![Ok(Some(status(Some(Commitment::Confirmed), Some(err))))]),
        );

        let start = Instant::now();
        let result = confirmer
            .wait_for_transaction(
                &Signature::new_unique(),
                Commitment::Confirmed,
                Duration::from_millis(90_000),
                Duration::from_millis(2_000),
            )
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), r#"{"InstructionError":[0,"Custom"]}"#);
        assert!(matches!(err, ConfirmError::OnChainFailure(_)));
        assert!(start.elapsed() < Duration::from_millis(1));
        assert_eq!(rpc.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_names_signature() {
        let (confirmer, rpc) = confirmer(MockRpc::new().with_statuses(vec![Ok(None)]));
        let signature = Signature::new_unique();

        let start = Instant::now();
        let result = confirmer
            .wait_for_transaction(
                &signature,
                Commitment::Confirmed,
                Duration::from_millis(5_000),
                Duration::from_millis(2_000),
            )
            .await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(5_000));
        assert!(elapsed <= Duration::from_millis(6_000));

        let err = result.unwrap_err();
        assert!(matches!(err, ConfirmError::Timeout { timeout_ms: 5_000, .. }));
        assert!(err.to_string().contains(&signature.to_string()));
        assert_eq!(rpc.status_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_keeps_polling() {
        let (confirmer, rpc) = confirmer(MockRpc::new().with_statuses(vec![
            Err(transport_error()),
            Err(transport_error()),
            Ok(Some(status(Some(Commitment::Finalized), None))),
        ]));

        let result = confirmer
            .wait_for_transaction(
                &Signature::new_unique(),
                Commitment::Confirmed,
                Duration::from_millis(30_000),
                Duration::from_millis(1_000),
            )
            .await;

        assert_eq!(result, Ok(()));
        assert_eq!(rpc.status_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_below_commitment_keeps_polling() {
        let (confirmer, _rpc) = confirmer(MockRpc::new().with_statuses(vec![
            Ok(Some(status(Some(Commitment::Processed), None))),
            Ok(Some(status(Some(Commitment::Confirmed), None))),
        ]));

        let start = Instant::now();
        let result = confirmer
            .wait_for_transaction(
                &Signature::new_unique(),
                Commitment::Finalized,
                Duration::from_millis(4_000),
                Duration::from_millis(1_000),
            )
            .await;

        assert!(matches!(result, Err(ConfirmError::Timeout { .. })));
        assert!(start.elapsed() >= Duration::from_millis(4_000));
        assert!(start.elapsed() < Duration::from_millis(5_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_waits_are_independent() {
        let ok = Arc::new(MockRpc::new().with_statuses(vec![
            Ok(None),
            Ok(Some(status(Some(Commitment::Confirmed), None))),
        ]));
        let pending = Arc::new(MockRpc::new().with_statuses(vec![Ok(None)]));

        let a = Confirmer::new(ok, &RelayConfig::default());
        let b = Confirmer::new(pending, &RelayConfig::default());
        let sig_a = Signature::new_unique();
        let sig_b = Signature::new_unique();

        let (ra, rb) = tokio::join!(
            a.wait_for_transaction(
                &sig_a,
                Commitment::Confirmed,
                Duration::from_millis(10_000),
                Duration::from_millis(1_000),
            ),
            b.wait_for_transaction(
                &sig_b,
                Commitment::Confirmed,
                Duration::from_millis(3_000),
                Duration::from_millis(1_000),
            ),
        );

        assert_eq!(ra, Ok(()));
        assert!(rb.unwrap_err().to_string().contains(&sig_b.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_uses_configured_defaults() {
        let (confirmer, rpc) = confirmer(
            MockRpc::new().with_statuses(vec![Ok(None), Ok(None), Ok(Some(status(Some(Commitment::Confirmed), None)))]),
        );

        let start = Instant::now();
        assert_eq!(confirmer.wait(&Signature::new_unique()).await, Ok(()));
        assert!(start.elapsed() >= Duration::from_millis(4_000));
        assert!(start.elapsed() < Duration::from_millis(6_000));
        assert_eq!(rpc.status_calls(), 3);
    }
}
