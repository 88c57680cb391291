//! Freshness and signature bookkeeping over `solana_sdk` transactions.

use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TxBuildError {
    #[error("Invalid transaction bytes: {0}")]
    Decode(String),

    #[error("Missing signature for {0}")]
    MissingSignature(Pubkey),
}

/// A transaction carrying a fresh blockhash, plus the last block height at
/// which that blockhash is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
    pub transaction: Transaction,
    pub last_valid_block_height: u64,
}

/// Queries over the compiled message of a transaction.
pub trait TransactionExt {
    /// First required signer, which pays the fees.
    fn fee_payer(&self) -> Option<Pubkey>;

    /// False while the message still carries the all-zero placeholder blockhash.
    fn has_recent_blockhash(&self) -> bool;

    /// True once fee payer and blockhash are both set.
    fn is_prepared(&self) -> bool {
        self.fee_payer().is_some() && self.has_recent_blockhash()
    }

    /// The fee payer's signature, which identifies the transaction on-chain.
    fn fee_payer_signature(&self) -> Option<Signature>;

    /// First required signer that has not signed yet.
    fn unsigned_signer(&self) -> Option<Pubkey>;
}

impl TransactionExt for Transaction {
    fn fee_payer(&self) -> Option<Pubkey> {
        if self.message.header.num_required_signatures == 0 {
            return None;
        }
        self.message.account_keys.first().copied()
    }

    fn has_recent_blockhash(&self) -> bool {
        self.message.recent_blockhash != Hash::default()
    }

    fn fee_payer_signature(&self) -> Option<Signature> {
        self.fee_payer()?;
        self.signatures
            .first()
            .copied()
            .filter(|signature| *signature != Signature::default())
    }

    fn unsigned_signer(&self) -> Option<Pubkey> {
        let required = usize::from(self.message.header.num_required_signatures);
        self.message
            .account_keys
            .iter()
            .take(required)
            .enumerate()
            .find(|(i, _)| {
                self.signatures
                    .get(*i)
                    .map_or(true, |signature| *signature == Signature::default())
            })
            .map(|(_, key)| *key)
    }
}

/// Decode a transaction from its wire bytes.
pub fn decode_wire(bytes: &[u8]) -> Result<Transaction, TxBuildError> {
    bincode::deserialize(bytes).map_err(|e| TxBuildError::Decode(e.to_string()))
}
