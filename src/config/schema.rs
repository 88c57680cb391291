//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::network::Network;
use crate::confirm::simulate::DEFAULT_LOG_TAIL;
use crate::rpc::types::Commitment;

/// Root configuration for the transaction relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Cluster selector (devnet, testnet, mainnet-beta, localnet).
    pub network: Network,

    /// RPC endpoints and per-request timeout.
    pub rpc: RpcConfig,

    /// Block explorer used in diagnostics.
    pub explorer: ExplorerConfig,

    /// Poll-loop confirmation settings.
    pub confirmation: ConfirmationConfig,

    /// Backoff confirmation settings.
    pub retries: RetryConfig,

    /// Pre-flight simulation settings.
    pub simulation: SimulationConfig,

    /// Raw transaction submission options.
    pub send: SendConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl RelayConfig {
    /// Primary RPC URL, falling back to the network's public endpoint.
    pub fn primary_rpc_url(&self) -> String {
        if self.rpc.primary_url.trim().is_empty() {
            self.network.default_rpc_url().to_string()
        } else {
            self.rpc.primary_url.clone()
        }
    }

    /// All endpoints in failover order: primary first, then configured fallbacks.
    pub fn rpc_endpoints(&self) -> Vec<String> {
        let mut endpoints = vec![self.primary_rpc_url()];
        endpoints.extend(
            self.rpc
                .fallback_urls
                .iter()
                .filter(|url| !url.trim().is_empty())
                .cloned(),
        );
        endpoints
    }
}

/// RPC connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL. Empty means the network default.
    pub primary_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order.
    pub fallback_urls: Vec<String>,

    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl RpcConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            primary_url: String::new(),
            fallback_urls: Vec::new(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Block explorer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Explorer base URL (without trailing slash).
    pub base_url: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://explorer.solana.com".to_string(),
        }
    }
}

/// Bounded poll-loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Target commitment level.
    pub commitment: Commitment,

    /// Wall-clock budget for one confirmation in milliseconds.
    pub timeout_ms: u64,

    /// Sleep between status checks in milliseconds.
    pub poll_interval_ms: u64,

    /// Ask the node to search full transaction history.
    pub search_history: bool,
}

impl ConfirmationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            commitment: Commitment::Confirmed,
            timeout_ms: 90_000,
            poll_interval_ms: 2_000,
            search_history: true,
        }
    }
}

/// Exponential backoff confirmation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of confirmation attempts.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Cap on a single attempt in milliseconds.
    pub attempt_timeout_ms: u64,

    /// Global budget across all attempts in milliseconds.
    pub total_timeout_ms: u64,
}

impl RetryConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn total_timeout(&self) -> Duration {
        Duration::from_millis(self.total_timeout_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 5_000,
            attempt_timeout_ms: 30_000,
            total_timeout_ms: 60_000,
        }
    }
}

/// Pre-flight simulation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulate before submitting.
    pub enabled: bool,

    /// Refuse to submit when simulation reports an on-chain error.
    pub abort_on_error: bool,

    /// Number of trailing log lines written to diagnostics.
    pub log_tail: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            abort_on_error: false,
            log_tail: DEFAULT_LOG_TAIL,
        }
    }
}

/// `sendTransaction` options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SendConfig {
    /// Skip the node's own preflight checks.
    pub skip_preflight: bool,

    /// Node-side rebroadcast attempts.
    pub max_retries: usize,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            skip_preflight: true,
            max_retries: 3,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.network, Network::Devnet);
        assert_eq!(config.confirmation.commitment, Commitment::Confirmed);
        assert_eq!(config.confirmation.timeout_ms, 90_000);
        assert_eq!(config.confirmation.poll_interval_ms, 2_000);
        assert_eq!(config.retries.max_attempts, 3);
        assert!(config.send.skip_preflight);
        assert_eq!(config.simulation.log_tail, DEFAULT_LOG_TAIL);
    }

    #[test]
    fn test_primary_url_falls_back_to_network() {
        let mut config = RelayConfig::default();
        config.network = Network::Testnet;
        assert_eq!(config.primary_rpc_url(), "https://api.testnet.solana.com");

        config.rpc.primary_url = "https://rpc.example.org".to_string();
        config.rpc.fallback_urls = vec!["https://backup.example.org".to_string(), " ".to_string()];
        assert_eq!(
            config.rpc_endpoints(),
            vec!["https://rpc.example.org", "https://backup.example.org"]
        );
    }

    #[test]
    fn test_partial_toml() {
        let config: RelayConfig = toml::from_str(
            r#"
            network = "mainnet-beta"

            [confirmation]
            commitment = "finalized"
            poll_interval_ms = 3000
            "#,
        )
        .unwrap();
        assert_eq!(config.network, Network::MainnetBeta);
        assert_eq!(config.confirmation.commitment, Commitment::Finalized);
        assert_eq!(config.confirmation.poll_interval_ms, 3000);
        assert_eq!(config.confirmation.timeout_ms, 90_000);
    }
}
