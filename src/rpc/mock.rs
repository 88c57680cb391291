//! Scripted in-memory `SolanaRpc` for unit tests.

use async_trait::async_trait;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

use crate::rpc::client::SolanaRpc;
use crate::rpc::types::{
    Account, Commitment, Hash, LatestBlockhash, RpcError, RpcResult, SendOptions, Signature,
    SignatureStatus, SimulateOptions, SimulationValue,
};

/// Interval between status reads inside the scripted confirmation wait.
pub(crate) const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Build a signature status at `level` with an optional recorded error.
pub(crate) fn status(level: Option<Commitment>, err: Option<Value>) -> SignatureStatus {
    SignatureStatus {
        slot: 42,
        confirmations: Some(1),
        err,
        confirmation_status: level,
    }
}

pub(crate) fn transport_error() -> RpcError {
    RpcError::Transport {
        endpoint: "http://mock".to_string(),
        message: "connection reset".to_string(),
    }
}

/// Blockhash served by the mock.
pub(crate) fn mock_blockhash() -> Hash {
    Hash::new_from_array([7u8; 32])
}

/// Pops scripted responses in order; the last one repeats forever.
fn next<T: Clone>(queue: &Mutex<VecDeque<RpcResult<T>>>, empty: T) -> RpcResult<T> {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue.front().cloned().unwrap_or(Ok(empty))
    }
}

pub(crate) struct MockRpc {
    statuses: Mutex<VecDeque<RpcResult<Option<SignatureStatus>>>>,
    accounts: Mutex<VecDeque<RpcResult<Option<Account>>>>,
    blockhash: Mutex<RpcResult<LatestBlockhash>>,
    block_height: AtomicU64,
    simulation: Mutex<RpcResult<SimulationValue>>,
    send_result: Mutex<Option<RpcResult<Signature>>>,
    pub status_calls: AtomicUsize,
    pub blockhash_calls: AtomicUsize,
    pub account_calls: AtomicUsize,
    pub simulate_calls: Mutex<Vec<SimulateOptions>>,
    pub sent: Mutex<Vec<Transaction>>,
}

impl MockRpc {
    pub(crate) fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            accounts: Mutex::new(VecDeque::new()),
            blockhash: Mutex::new(Ok(LatestBlockhash {
                blockhash: mock_blockhash(),
                last_valid_block_height: 1_000,
            })),
            block_height: AtomicU64::new(900),
            simulation: Mutex::new(Ok(SimulationValue::default())),
            send_result: Mutex::new(None),
            status_calls: AtomicUsize::new(0),
            blockhash_calls: AtomicUsize::new(0),
            account_calls: AtomicUsize::new(0),
            simulate_calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_statuses(self, statuses: Vec<RpcResult<Option<SignatureStatus>>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub(crate) fn with_accounts(self, accounts: Vec<RpcResult<Option<Account>>>) -> Self {
        *self.accounts.lock().unwrap() = accounts.into();
        self
    }

    pub(crate) fn with_blockhash(self, blockhash: RpcResult<LatestBlockhash>) -> Self {
        *self.blockhash.lock().unwrap() = blockhash;
        self
    }

    pub(crate) fn with_block_height(self, height: u64) -> Self {
        self.block_height.store(height, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_simulation(self, simulation: RpcResult<SimulationValue>) -> Self {
        *self.simulation.lock().unwrap() = simulation;
        self
    }

    /// Override the send answer; by default the mock echoes the fee payer signature.
    pub(crate) fn with_send_result(self, result: RpcResult<Signature>) -> Self {
        *self.send_result.lock().unwrap() = Some(result);
        self
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SolanaRpc for MockRpc {
    async fn get_latest_blockhash(&self, _commitment: Commitment) -> RpcResult<LatestBlockhash> {
        self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        self.blockhash.lock().unwrap().clone()
    }

    async fn get_block_height(&self, _commitment: Commitment) -> RpcResult<u64> {
        Ok(self.block_height.load(Ordering::SeqCst))
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
        _search_history: bool,
    ) -> RpcResult<Option<SignatureStatus>> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.statuses, None)
    }

    async fn get_account(
        &self,
        _address: &Pubkey,
        _commitment: Commitment,
    ) -> RpcResult<Option<Account>> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        next(&self.accounts, None)
    }

    async fn simulate_transaction(
        &self,
        _transaction: &Transaction,
        options: SimulateOptions,
    ) -> RpcResult<SimulationValue> {
        self.simulate_calls.lock().unwrap().push(options);
        self.simulation.lock().unwrap().clone()
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        _options: SendOptions,
    ) -> RpcResult<Signature> {
        self.sent.lock().unwrap().push(transaction.clone());
        match self.send_result.lock().unwrap().clone() {
            Some(result) => result,
            None => Ok(transaction.signatures.first().copied().unwrap_or_default()),
        }
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &LatestBlockhash,
        commitment: Commitment,
    ) -> RpcResult<Option<Value>> {
        loop {
            if let Some(status) = self.get_signature_status(signature, false).await? {
                if let Some(err) = status.err {
                    return Ok(Some(err));
                }
                if status.satisfies(commitment) {
                    return Ok(None);
                }
            }

            let height = self.get_block_height(commitment).await?;
            if height > blockhash.last_valid_block_height {
                return Err(RpcError::NotConfirmed(format!(
                    "block height {} exceeds last valid height {}",
                    height, blockhash.last_valid_block_height
                )));
            }

            sleep(CONFIRM_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_confirm_transaction_lands() {
        let rpc = MockRpc::new()
            .with_statuses(vec![Ok(None), Ok(Some(status(Some(Commitment::Confirmed), None)))]);
        let blockhash = LatestBlockhash {
            blockhash: mock_blockhash(),
            last_valid_block_height: 1_000,
        };
        let result = rpc
            .confirm_transaction(&Signature::new_unique(), &blockhash, Commitment::Confirmed)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(rpc.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_transaction_blockhash_expired() {
        let rpc = MockRpc::new().with_statuses(vec![Ok(None)]).with_block_height(500);
        let blockhash = LatestBlockhash {
            blockhash: mock_blockhash(),
            last_valid_block_height: 499,
        };
        let err = rpc
            .confirm_transaction(&Signature::new_unique(), &blockhash, Commitment::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::NotConfirmed(ref msg) if msg.contains("500")));
    }
}
