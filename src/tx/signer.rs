//! Wallet boundary.
//!
//! # Security
//! - Wallets sign on our behalf; only `KeypairSigner` holds key material
//! - A signer only ever sees prepared transactions

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    /// The user or wallet declined to sign.
    #[error("Signing rejected: {0}")]
    Rejected(String),

    #[error("Signing failed: {0}")]
    Failed(String),
}

/// Signing capability supplied by a wallet.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Key that pays fees and signs.
    fn pubkey(&self) -> Pubkey;

    /// Return `transaction` with this signer's signature attached.
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, SignerError>;

    /// Sign a batch. Wallets with native batch approval should override this.
    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<Transaction>, SignerError> {
        let mut signed = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            signed.push(self.sign_transaction(transaction).await?);
        }
        Ok(signed)
    }
}

/// Local keypair wallet.
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction, SignerError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| SignerError::Failed(e.to_string()))?;
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::message::Message;
    use solana_sdk::system_instruction;

    #[tokio::test]
    async fn test_keypair_signer_signs_as_fee_payer() {
        let signer = KeypairSigner::new(Keypair::new());
        let ix = system_instruction::transfer(&signer.pubkey(), &Pubkey::new_unique(), 5);
        let message =
            Message::new_with_blockhash(&[ix], Some(&signer.pubkey()), &Hash::new_from_array([2; 32]));

        let signed = signer
            .sign_all_transactions(vec![Transaction::new_unsigned(message)])
            .await
            .unwrap();
        assert_eq!(signed.len(), 1);
        assert!(signed[0].verify().is_ok());
    }

    #[tokio::test]
    async fn test_keypair_signer_rejects_foreign_transaction() {
        let signer = KeypairSigner::new(Keypair::new());
        let other = Pubkey::new_unique();
        let ix = system_instruction::transfer(&other, &Pubkey::new_unique(), 5);
        let tx = Transaction::new_unsigned(Message::new(&[ix], Some(&other)));

        let err = signer.sign_transaction(tx).await.unwrap_err();
        assert!(matches!(err, SignerError::Failed(_)));
    }
}
