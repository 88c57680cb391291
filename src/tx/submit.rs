//! Submission helper: prepare, simulate, sign, send, confirm.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{RelayConfig, SendConfig, SimulationConfig};
use crate::confirm::{simulate_transaction, ConfirmError, Confirmer, SimulationOutcome};
use crate::rpc::client::SolanaRpc;
use crate::rpc::types::{Commitment, RpcError, RpcResult, SendOptions, Signature};
use crate::tx::signer::{SignerError, TransactionSigner};
use crate::tx::transaction::{PreparedTransaction, TransactionExt, TxBuildError};
use crate::tx::{Instruction, Message, Pubkey, Transaction};

#[derive(Debug, Error)]
pub enum TxError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Build(#[from] TxBuildError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error("Simulation failed: {error}")]
    SimulationRejected { error: String, logs: Vec<String> },

    #[error("Transaction {signature}: {source}")]
    Confirmation {
        signature: Signature,
        #[source]
        source: ConfirmError,
    },
}

/// Sends transactions through an RPC node and confirms them.
#[derive(Debug, Clone)]
pub struct TxSender {
    confirmer: Confirmer,
    commitment: Commitment,
    simulation: SimulationConfig,
    send: SendConfig,
}

impl TxSender {
    pub fn new(rpc: Arc<dyn SolanaRpc>, config: &RelayConfig) -> Self {
        Self {
            confirmer: Confirmer::new(rpc, config),
            commitment: config.confirmation.commitment,
            simulation: config.simulation.clone(),
            send: config.send.clone(),
        }
    }

    pub fn confirmer(&self) -> &Confirmer {
        &self.confirmer
    }

    fn rpc(&self) -> &dyn SolanaRpc {
        self.confirmer.rpc().as_ref()
    }

    /// Compile `instructions` for `fee_payer` against a fresh blockhash.
    ///
    /// Blockhash fetch errors are returned as-is.
    pub async fn prepare(
        &self,
        instructions: &[Instruction],
        fee_payer: &Pubkey,
    ) -> RpcResult<PreparedTransaction> {
        let latest = self.rpc().get_latest_blockhash(self.commitment).await?;
        let message = Message::new_with_blockhash(instructions, Some(fee_payer), &latest.blockhash);

        debug!(
            fee_payer = %fee_payer,
            blockhash = %latest.blockhash,
            last_valid_block_height = latest.last_valid_block_height,
            "Transaction prepared"
        );

        Ok(PreparedTransaction {
            transaction: Transaction::new_unsigned(message),
            last_valid_block_height: latest.last_valid_block_height,
        })
    }

    pub async fn simulate(&self, transaction: &Transaction) -> SimulationOutcome {
        simulate_transaction(self.rpc(), transaction, self.commitment, self.simulation.log_tail).await
    }

    fn send_options(&self) -> SendOptions {
        SendOptions {
            skip_preflight: self.send.skip_preflight,
            preflight_commitment: self.commitment,
            max_retries: Some(self.send.max_retries),
        }
    }

    /// Submit a fully signed transaction.
    pub async fn send(&self, transaction: &Transaction) -> Result<Signature, TxError> {
        if let Some(signer) = transaction.unsigned_signer() {
            return Err(TxBuildError::MissingSignature(signer).into());
        }

        let signature = self
            .rpc()
            .send_transaction(transaction, self.send_options())
            .await?;
        info!(
            signature = %signature,
            explorer_url = %self.confirmer.explorer().tx_url(&signature),
            "Transaction submitted"
        );
        Ok(signature)
    }

    /// Prepare every instruction set for `signer` and have it sign the batch.
    pub async fn sign_all(
        &self,
        signer: &dyn TransactionSigner,
        batches: &[Vec<Instruction>],
    ) -> Result<Vec<PreparedTransaction>, TxError> {
        let fee_payer = signer.pubkey();
        let mut heights = Vec::with_capacity(batches.len());
        let mut unsigned = Vec::with_capacity(batches.len());
        for instructions in batches {
            let prepared = self.prepare(instructions, &fee_payer).await?;
            heights.push(prepared.last_valid_block_height);
            unsigned.push(prepared.transaction);
        }

        let signed = signer.sign_all_transactions(unsigned).await?;
        Ok(signed
            .into_iter()
            .zip(heights)
            .map(|(transaction, last_valid_block_height)| PreparedTransaction {
                transaction,
                last_valid_block_height,
            })
            .collect())
    }

    /// Prepare, optionally simulate, sign, send and wait for confirmation.
    pub async fn sign_send_and_confirm(
        &self,
        signer: &dyn TransactionSigner,
        instructions: &[Instruction],
    ) -> Result<Signature, TxError> {
        let prepared = self.prepare(instructions, &signer.pubkey()).await?;

        if self.simulation.enabled {
            let outcome = self.simulate(&prepared.transaction).await;
            if !outcome.success {
                let error = outcome.error.unwrap_or_default();
                if self.simulation.abort_on_error {
                    return Err(TxError::SimulationRejected {
                        error,
                        logs: outcome.logs,
                    });
                }
                warn!(error = %error, "Simulation failed, submitting anyway");
            }
        }

        let signed = signer.sign_transaction(prepared.transaction).await?;
        let signature = self.send(&signed).await?;

        self.confirmer
            .wait(&signature)
            .await
            .map_err(|source| TxError::Confirmation { signature, source })?;

        Ok(signature)
    }
}
