//! Confirmation outcomes and the closed error taxonomy.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::rpc::types::{RpcError, Signature};

/// Result of a single status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCheck {
    /// Recorded without error at or above the desired commitment.
    Success,
    /// Recorded with an on-chain error (raw error JSON).
    Failed(String),
    /// Unknown to the node, or below the desired commitment.
    NotFound,
}

impl StatusCheck {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            StatusCheck::Success => "success",
            StatusCheck::Failed(_) => "failed",
            StatusCheck::NotFound => "not_found",
        }
    }
}

/// Why a confirmation did not succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfirmError {
    /// The transaction executed and failed; never retried.
    #[error("{0}")]
    OnChainFailure(String),

    #[error("Transaction not confirmed within {timeout_ms}ms. Check signature {signature} on Solana Explorer.")]
    Timeout { signature: Signature, timeout_ms: u64 },

    /// Transport or node failure; the transaction may still land.
    #[error("Transient RPC failure: {0}")]
    TransportTransient(String),

    /// Backoff confirmation ran out of attempts; `last_error` is why the
    /// final attempt ended.
    #[error("Confirmation failed after {attempts} attempts: {last_error}")]
    Exhausted {
        attempts: u32,
        #[source]
        last_error: Box<ConfirmError>,
    },
}

impl ConfirmError {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            ConfirmError::OnChainFailure(_) => "failed",
            ConfirmError::Timeout { .. } => "timeout",
            ConfirmError::TransportTransient(_) => "transport",
            ConfirmError::Exhausted { .. } => "exhausted",
        }
    }
}

impl From<RpcError> for ConfirmError {
    fn from(err: RpcError) -> Self {
        ConfirmError::TransportTransient(err.to_string())
    }
}

pub type ConfirmResult = Result<(), ConfirmError>;

/// `{ success, error? }` summary for callers that want a plain record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ConfirmResult> for ConfirmationReport {
    fn from(result: &ConfirmResult) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                error: None,
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Compact JSON rendering of a raw chain error.
pub fn render_error(err: &Value) -> String {
    err.to_string()
}
