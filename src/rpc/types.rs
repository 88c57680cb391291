//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use solana_sdk::account::Account;
pub use solana_sdk::hash::Hash;
pub use solana_sdk::signature::Signature;

/// Acknowledgment strength of a transaction, weakest first.
///
/// The derived ordering is meaningful: a status at a stronger level
/// satisfies every weaker desired level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    /// Strongest level first.
    pub const STRONGEST_FIRST: [Commitment; 3] = [
        Commitment::Finalized,
        Commitment::Confirmed,
        Commitment::Processed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    /// True when a status observed at `self` satisfies `desired`.
    pub fn satisfies(&self, desired: Commitment) -> bool {
        *self >= desired
    }

    pub fn level(&self) -> CommitmentLevel {
        match self {
            Commitment::Processed => CommitmentLevel::Processed,
            Commitment::Confirmed => CommitmentLevel::Confirmed,
            Commitment::Finalized => CommitmentLevel::Finalized,
        }
    }
}

impl From<Commitment> for CommitmentConfig {
    fn from(commitment: Commitment) -> Self {
        CommitmentConfig {
            commitment: commitment.level(),
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment '{}'", other)),
        }
    }
}

/// Freshness token plus the last block height at which it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Status of a signature as reported by `getSignatureStatuses`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureStatus {
    pub slot: u64,
    pub confirmations: Option<u64>,
    /// Raw transaction error recorded on-chain, if any.
    pub err: Option<serde_json::Value>,
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// True when the status has reached `desired`.
    ///
    /// Nodes that omit `confirmationStatus` report `confirmations: null`
    /// only for rooted (finalized) transactions.
    pub fn satisfies(&self, desired: Commitment) -> bool {
        match self.confirmation_status {
            Some(level) => level.satisfies(desired),
            None => self.confirmations.is_none(),
        }
    }
}

/// `value` of a `simulateTransaction` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationValue {
    pub err: Option<serde_json::Value>,
    pub logs: Option<Vec<String>>,
    pub units_consumed: Option<u64>,
}

/// Options for `simulateTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulateOptions {
    pub commitment: Commitment,
    /// Let the node swap in a fresh blockhash; mutually exclusive with `sig_verify`.
    pub replace_recent_blockhash: bool,
    pub sig_verify: bool,
}

/// Options for `sendTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub skip_preflight: bool,
    pub preflight_commitment: Commitment,
    pub max_retries: Option<usize>,
}

/// Errors that can occur during RPC operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    /// Connection, HTTP status or body read failure.
    #[error("Transport error from {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// RPC request timed out.
    #[error("RPC timeout after {0} ms")]
    Timeout(u64),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node rejected the transaction itself.
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    /// The node answered with something we could not decode.
    #[error("Malformed RPC response: {0}")]
    Malformed(String),

    /// Every configured endpoint failed.
    #[error("All RPC endpoints failed: {0}")]
    AllEndpointsFailed(String),

    /// The node gave up waiting for the transaction, usually because its
    /// blockhash expired first.
    #[error("Transaction not confirmed: {0}")]
    NotConfirmed(String),

    /// An endpoint URL could not be parsed.
    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl RpcError {
    /// True when the node itself answered, so another endpoint would
    /// answer the same way.
    pub fn is_node_answer(&self) -> bool {
        matches!(self, RpcError::Rpc { .. } | RpcError::TransactionRejected(_))
    }
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;
