//! Solana transaction reliability layer.
//!
//! Submits transactions and confirms them against a commitment level with
//! bounded polling, exponential-backoff retry, RPC failover and pre-flight
//! simulation.
//!
//! # Architecture Overview
//!
//! ```text
//!  Instructions ──▶ tx::TxSender ──prepare──▶ rpc::SolanaRpc (getLatestBlockhash)
//!                        │
//!                        ├──simulate──▶ confirm::simulate (fail-open)
//!                        ├──sign─────▶ tx::TransactionSigner (wallet)
//!                        ├──send─────▶ rpc::SolanaRpc (sendTransaction)
//!                        ▼
//!                 confirm::Confirmer ──▶ status checks ──▶ Ok(()) | ConfirmError
//!
//!   Cross-cutting: config (TOML + env), diagnostics (explorer, classify),
//!                  observability (tracing, metrics)
//! ```

// Core subsystems
pub mod config;
pub mod rpc;
pub mod tx;

// Reliability
pub mod accounts;
pub mod confirm;

// Cross-cutting concerns
pub mod diagnostics;
pub mod observability;

pub use config::RelayConfig;
pub use confirm::{ConfirmError, Confirmer, StatusCheck};
pub use rpc::{Commitment, HttpRpcClient, Signature, SolanaRpc};
pub use tx::{Transaction, TxSender};
