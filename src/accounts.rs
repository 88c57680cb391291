//! Account reads with fixed-delay retry.
//!
//! Freshly created accounts are often not yet visible on every RPC node, so
//! missing or empty accounts count as a failed attempt rather than an answer.

use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::rpc::client::SolanaRpc;
use crate::rpc::types::{Account, Commitment, RpcError};
use crate::tx::Pubkey;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Length of an x25519 public key.
pub const MXE_KEY_LEN: usize = 32;

/// Anchor account discriminator length.
const DISCRIMINATOR_LEN: usize = 8;

/// Furthest offset scanned when neither standard layout holds a key.
const MAX_SCAN_OFFSET: usize = 16;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Account {0} does not exist")]
    NotFound(Pubkey),

    #[error("Account {0} exists but has no data")]
    Empty(Pubkey),

    #[error("Account data is too short ({0} bytes), expected at least 32 bytes")]
    TooShort(usize),

    #[error("No non-zero 32-byte key found in {0} bytes of account data")]
    KeyNotFound(usize),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Failed to read account {address} after {attempts} attempts: {last_error}")]
    Exhausted {
        address: Pubkey,
        attempts: u32,
        last_error: String,
    },
}

/// Read `address`, retrying up to `max_retries` times with `delay` between attempts.
pub async fn fetch_account_with_retry(
    rpc: &dyn SolanaRpc,
    address: &Pubkey,
    max_retries: u32,
    delay: Duration,
) -> Result<Account, AccountError> {
    read_with_retry(rpc, address, max_retries, delay, Ok).await
}

/// Read the MPC execution environment (MXE) account and extract its public key.
///
/// Parse failures are retried too: a node may serve a stale, zeroed copy.
pub async fn read_mxe_public_key(
    rpc: &dyn SolanaRpc,
    address: &Pubkey,
    max_retries: u32,
    delay: Duration,
) -> Result<[u8; MXE_KEY_LEN], AccountError> {
    read_with_retry(rpc, address, max_retries, delay, |account| {
        extract_mxe_public_key(&account.data)
    })
    .await
}

async fn read_with_retry<T>(
    rpc: &dyn SolanaRpc,
    address: &Pubkey,
    max_retries: u32,
    delay: Duration,
    parse: impl Fn(Account) -> Result<T, AccountError>,
) -> Result<T, AccountError> {
    let attempts = max_retries.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        let result = match rpc.get_account(address, Commitment::Confirmed).await {
            Ok(Some(account)) if account.data.is_empty() => Err(AccountError::Empty(*address)),
            Ok(Some(account)) => {
                debug!(
                    address = %address,
                    owner = %account.owner,
                    data_len = account.data.len(),
                    "Account found"
                );
                parse(account)
            }
            Ok(None) => Err(AccountError::NotFound(*address)),
            Err(e) => Err(AccountError::Rpc(e)),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(address = %address, attempt, error = %e, "Account read failed");
                last_error = e.to_string();
            }
        }

        if attempt < attempts {
            sleep(delay).await;
        }
    }

    Err(AccountError::Exhausted {
        address: *address,
        attempts,
        last_error,
    })
}

/// Locate the 32-byte x25519 key in MXE account data.
///
/// Tries offset 0 (no discriminator), then offset 8 (after the Anchor
/// discriminator), then the first non-zero window in offsets 0..=16.
pub fn extract_mxe_public_key(data: &[u8]) -> Result<[u8; MXE_KEY_LEN], AccountError> {
    if data.len() < MXE_KEY_LEN {
        return Err(AccountError::TooShort(data.len()));
    }

    let window = |offset: usize| -> Option<[u8; MXE_KEY_LEN]> {
        let chunk = data.get(offset..offset + MXE_KEY_LEN)?;
        if chunk.iter().all(|b| *b == 0) {
            return None;
        }
        chunk.try_into().ok()
    };

    let last_offset = MAX_SCAN_OFFSET.min(data.len() - MXE_KEY_LEN);

    [0, DISCRIMINATOR_LEN]
        .into_iter()
        .chain(0..=last_offset)
        .find_map(window)
        .ok_or(AccountError::KeyNotFound(data.len()))
}
