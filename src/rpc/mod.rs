//! RPC node boundary.
//!
//! # Data Flow
//! ```text
//! RelayConfig (network, primary + fallback URLs)
//!     → client.rs (HttpRpcClient: one RpcClient per endpoint, timeouts, failover)
//!     → SolanaRpc trait object
//!     → confirm / tx / accounts
//! ```
//!
//! # Design Decisions
//! - The reliability layer depends on the `SolanaRpc` capability, never on a concrete client
//! - Every RPC call has a configurable timeout
//! - Client errors are normalized into `RpcError` on receipt

pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{HttpRpcClient, SolanaRpc};
pub use types::{
    Account, Commitment, Hash, LatestBlockhash, RpcError, RpcResult, SendOptions, Signature,
    SignatureStatus, SimulateOptions, SimulationValue,
};
