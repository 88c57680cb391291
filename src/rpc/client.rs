//! Solana RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Define the capability interface the reliability layer depends on
//! - Drive one `RpcClient` per endpoint, primary first
//! - Bound every request with a timeout
//! - Normalize transport, protocol and decode failures into `RpcError`

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcSendTransactionConfig, RpcSimulateTransactionConfig};
use solana_client::rpc_request::RpcError as ClientRpcError;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::{Transaction, TransactionError};
use solana_transaction_status::{TransactionConfirmationStatus, UiTransactionEncoding};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::config::RelayConfig;
use crate::observability::metrics;
use crate::rpc::types::{
    Account, Commitment, LatestBlockhash, RpcError, RpcResult, SendOptions, Signature,
    SignatureStatus, SimulateOptions, SimulationValue,
};

/// Read/write capability interface over a Solana RPC node.
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// `getLatestBlockhash`.
    async fn get_latest_blockhash(&self, commitment: Commitment) -> RpcResult<LatestBlockhash>;

    /// `getBlockHeight`.
    async fn get_block_height(&self, commitment: Commitment) -> RpcResult<u64>;

    /// `getSignatureStatuses` for a single signature. `None` means the node
    /// has no record of it (yet).
    async fn get_signature_status(
        &self,
        signature: &Signature,
        search_history: bool,
    ) -> RpcResult<Option<SignatureStatus>>;

    /// `getAccountInfo`.
    async fn get_account(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> RpcResult<Option<Account>>;

    async fn simulate_transaction(
        &self,
        transaction: &Transaction,
        options: SimulateOptions,
    ) -> RpcResult<SimulationValue>;

    /// Submit a signed transaction and return its signature.
    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: SendOptions,
    ) -> RpcResult<Signature>;

    /// Wait until `signature` reaches `commitment` or its blockhash expires.
    ///
    /// Returns the recorded transaction error, or `None` when it landed cleanly.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &LatestBlockhash,
        commitment: Commitment,
    ) -> RpcResult<Option<Value>>;
}

#[derive(Clone)]
struct Endpoint {
    url: Url,
    client: Arc<RpcClient>,
}

/// What the client's own confirmation wait reported.
enum ConfirmAnswer {
    Landed,
    Failed(TransactionError),
    Abandoned(String),
}

/// RPC client with primary + failover endpoints.
#[derive(Clone)]
pub struct HttpRpcClient {
    /// Primary first, then fallbacks.
    endpoints: Vec<Endpoint>,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl HttpRpcClient {
    /// Create a client over `urls` (primary first).
    ///
    /// An unparseable primary URL is an error; unparseable fallbacks are
    /// skipped with a warning.
    pub fn new(urls: &[String], request_timeout: Duration) -> RpcResult<Self> {
        let (primary, fallbacks) = urls.split_first().ok_or_else(|| RpcError::InvalidUrl {
            url: String::new(),
            reason: "no RPC endpoint configured".to_string(),
        })?;

        let mut parsed = vec![Url::parse(primary).map_err(|e| RpcError::InvalidUrl {
            url: primary.clone(),
            reason: e.to_string(),
        })?];

        for url_str in fallbacks {
            match Url::parse(url_str) {
                Ok(url) => parsed.push(url),
                Err(e) => tracing::warn!(url = %url_str, error = %e, "Ignoring invalid fallback RPC URL"),
            }
        }

        let endpoints: Vec<Endpoint> = parsed
            .into_iter()
            .map(|url| Endpoint {
                client: Arc::new(RpcClient::new_with_timeout_and_commitment(
                    url.to_string(),
                    request_timeout,
                    CommitmentConfig::confirmed(),
                )),
                url,
            })
            .collect();

        tracing::debug!(
            primary = %endpoints[0].url,
            fallbacks = endpoints.len() - 1,
            timeout_ms = request_timeout.as_millis() as u64,
            "RPC client initialized"
        );

        Ok(Self {
            endpoints,
            timeout_duration: request_timeout,
        })
    }

    /// Create a client from the relay configuration.
    pub fn from_config(config: &RelayConfig) -> RpcResult<Self> {
        Self::new(&config.rpc_endpoints(), config.rpc.request_timeout())
    }

    /// Endpoint URLs in failover order.
    pub fn endpoints(&self) -> Vec<&str> {
        self.endpoints.iter().map(|e| e.url.as_str()).collect()
    }

    /// Issue one bounded request against each endpoint in turn until one answers.
    async fn call<T, F, Fut>(&self, method: &'static str, op: F) -> RpcResult<T>
    where
        F: Fn(Arc<RpcClient>) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        self.failover(method, Some(self.timeout_duration), op).await
    }

    /// A JSON-RPC error object or a rejected transaction is an answer and
    /// stops the failover.
    async fn failover<T, F, Fut>(
        &self,
        method: &'static str,
        limit: Option<Duration>,
        op: F,
    ) -> RpcResult<T>
    where
        F: Fn(Arc<RpcClient>) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut failures = Vec::new();

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            let request = op(endpoint.client.clone());
            let result = match limit {
                Some(limit) => match timeout(limit, request).await {
                    Ok(result) => result.map_err(|e| map_client_error(&endpoint.url, &e)),
                    Err(_) => Err(RpcError::Timeout(limit.as_millis() as u64)),
                },
                None => request.await.map_err(|e| map_client_error(&endpoint.url, &e)),
            };

            match result {
                Ok(value) => {
                    if i > 0 {
                        metrics::record_rpc_failover(endpoint.url.as_str());
                    }
                    return Ok(value);
                }
                Err(e) if e.is_node_answer() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        provider_idx = i,
                        endpoint = %endpoint.url,
                        method,
                        error = %e,
                        "RPC error, trying next endpoint"
                    );
                    failures.push(e.to_string());
                }
            }
        }

        Err(RpcError::AllEndpointsFailed(failures.join("; ")))
    }
}

/// Fold a client error into the crate's error vocabulary.
fn map_client_error(endpoint: &Url, err: &ClientError) -> RpcError {
    match err.kind() {
        ClientErrorKind::RpcError(ClientRpcError::RpcResponseError { code, message, .. }) => {
            RpcError::Rpc {
                code: *code,
                message: message.clone(),
            }
        }
        ClientErrorKind::RpcError(ClientRpcError::ParseError(message)) => {
            RpcError::Malformed(message.clone())
        }
        ClientErrorKind::SerdeJson(e) => RpcError::Malformed(e.to_string()),
        ClientErrorKind::TransactionError(e) => RpcError::TransactionRejected(e.to_string()),
        _ => RpcError::Transport {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        },
    }
}

fn error_json<E: Serialize>(err: &E) -> RpcResult<Value> {
    serde_json::to_value(err).map_err(|e| RpcError::Malformed(format!("transaction error: {}", e)))
}

fn simulate_config(options: SimulateOptions) -> RpcSimulateTransactionConfig {
    RpcSimulateTransactionConfig {
        sig_verify: options.sig_verify,
        replace_recent_blockhash: options.replace_recent_blockhash,
        commitment: Some(options.commitment.into()),
        encoding: Some(UiTransactionEncoding::Base64),
        ..RpcSimulateTransactionConfig::default()
    }
}

fn send_config(options: SendOptions) -> RpcSendTransactionConfig {
    RpcSendTransactionConfig {
        skip_preflight: options.skip_preflight,
        preflight_commitment: Some(options.preflight_commitment.level()),
        encoding: Some(UiTransactionEncoding::Base64),
        max_retries: options.max_retries,
        ..RpcSendTransactionConfig::default()
    }
}

#[async_trait]
impl SolanaRpc for HttpRpcClient {
    async fn get_latest_blockhash(&self, commitment: Commitment) -> RpcResult<LatestBlockhash> {
        let config = CommitmentConfig::from(commitment);
        let (blockhash, last_valid_block_height) = self
            .call("getLatestBlockhash", move |client| async move {
                client.get_latest_blockhash_with_commitment(config).await
            })
            .await?;

        Ok(LatestBlockhash {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn get_block_height(&self, commitment: Commitment) -> RpcResult<u64> {
        let config = CommitmentConfig::from(commitment);
        self.call("getBlockHeight", move |client| async move {
            client.get_block_height_with_commitment(config).await
        })
        .await
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
        search_history: bool,
    ) -> RpcResult<Option<SignatureStatus>> {
        let signatures = [*signature];
        let response = self
            .call("getSignatureStatuses", move |client| async move {
                if search_history {
                    client.get_signature_statuses_with_history(&signatures).await
                } else {
                    client.get_signature_statuses(&signatures).await
                }
            })
            .await?;

        response
            .value
            .into_iter()
            .next()
            .flatten()
            .map(|status| -> RpcResult<SignatureStatus> {
                let level = match status.confirmation_status() {
                    TransactionConfirmationStatus::Processed => Commitment::Processed,
                    TransactionConfirmationStatus::Confirmed => Commitment::Confirmed,
                    TransactionConfirmationStatus::Finalized => Commitment::Finalized,
                };
                Ok(SignatureStatus {
                    slot: status.slot,
                    confirmations: status.confirmations.map(|c| c as u64),
                    err: status.err.as_ref().map(error_json).transpose()?,
                    confirmation_status: Some(level),
                })
            })
            .transpose()
    }

    async fn get_account(
        &self,
        address: &Pubkey,
        commitment: Commitment,
    ) -> RpcResult<Option<Account>> {
        let address = *address;
        let config = CommitmentConfig::from(commitment);
        let response = self
            .call("getAccountInfo", move |client| async move {
                client.get_account_with_commitment(&address, config).await
            })
            .await?;
        Ok(response.value)
    }

    async fn simulate_transaction(
        &self,
        transaction: &Transaction,
        options: SimulateOptions,
    ) -> RpcResult<SimulationValue> {
        let response = self
            .call("simulateTransaction", move |client| async move {
                client
                    .simulate_transaction_with_config(transaction, simulate_config(options))
                    .await
            })
            .await?;

        let value = response.value;
        Ok(SimulationValue {
            err: value.err.as_ref().map(error_json).transpose()?,
            logs: value.logs,
            units_consumed: value.units_consumed,
        })
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: SendOptions,
    ) -> RpcResult<Signature> {
        self.call("sendTransaction", move |client| async move {
            client
                .send_transaction_with_config(transaction, send_config(options))
                .await
        })
        .await
    }

    /// Delegates to the client's own confirmation wait, which gives up once
    /// the blockhash is no longer valid. Not bounded by the request timeout.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &LatestBlockhash,
        commitment: Commitment,
    ) -> RpcResult<Option<Value>> {
        let signature = *signature;
        let recent_blockhash = blockhash.blockhash;
        let config = CommitmentConfig::from(commitment);

        let answer = self
            .failover("confirmTransaction", None, move |client| async move {
                match client
                    .confirm_transaction_with_spinner(&signature, &recent_blockhash, config)
                    .await
                {
                    Ok(()) => Ok(ConfirmAnswer::Landed),
                    Err(err) => match err.kind() {
                        ClientErrorKind::TransactionError(tx_err) => {
                            Ok(ConfirmAnswer::Failed(tx_err.clone()))
                        }
                        ClientErrorKind::RpcError(ClientRpcError::ForUser(message)) => {
                            Ok(ConfirmAnswer::Abandoned(message.clone()))
                        }
                        _ => Err(err),
                    },
                }
            })
            .await?;

        match answer {
            ConfirmAnswer::Landed => Ok(None),
            ConfirmAnswer::Failed(err) => error_json(&err).map(Some),
            ConfirmAnswer::Abandoned(message) => Err(RpcError::NotConfirmed(message)),
        }
    }
}

impl std::fmt::Debug for HttpRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRpcClient")
            .field("endpoints", &self.endpoints())
            .field("timeout_ms", &self.timeout_duration.as_millis())
            .finish()
    }
}
