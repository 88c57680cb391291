//! Transaction preparation and submission.
//!
//! # Data Flow
//! ```text
//! Instructions
//!     → submit.rs (prepare: fee payer + fresh blockhash)
//!     → signer.rs (wallet signs the message)
//!     → SolanaRpc::send_transaction
//! ```

pub mod signer;
pub mod submit;
pub mod transaction;

pub use signer::{KeypairSigner, SignerError, TransactionSigner};
pub use submit::{TxError, TxSender};
pub use transaction::{decode_wire, PreparedTransaction, TransactionExt, TxBuildError};

pub use solana_sdk::instruction::{AccountMeta, Instruction};
pub use solana_sdk::message::Message;
pub use solana_sdk::pubkey::Pubkey;
pub use solana_sdk::transaction::Transaction;
