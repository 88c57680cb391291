//! Cluster selection.
//!
//! The network only drives string selection: default RPC endpoint, the
//! recommended fallback list shown in diagnostics, and the explorer
//! `cluster` query parameter. No other behavior branches on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Solana cluster the relay talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
}

impl Network {
    /// Cluster name as used by the explorer and the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::MainnetBeta => "mainnet-beta",
            Network::Localnet => "localnet",
        }
    }

    /// Public RPC endpoint used when no primary URL is configured.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Network::Localnet => "http://127.0.0.1:8899",
        }
    }

    /// Third-party endpoints suggested to operators when the primary is flaky.
    pub fn recommended_fallbacks(&self) -> &'static [&'static str] {
        match self {
            Network::Devnet => &[
                "https://rpc.ankr.com/solana_devnet",
                "https://devnet.helius-rpc.com",
                "https://solana-devnet.g.alchemy.com/v2/demo",
            ],
            Network::Testnet => &[
                "https://rpc.ankr.com/solana_testnet",
                "https://testnet.helius-rpc.com",
                "https://solana-testnet.g.alchemy.com/v2/demo",
            ],
            Network::MainnetBeta => &[
                "https://rpc.ankr.com/solana",
                "https://mainnet.helius-rpc.com",
                "https://solana-mainnet.g.alchemy.com/v2/demo",
            ],
            Network::Localnet => &[],
        }
    }

    /// Explorer `cluster` parameter. Mainnet is the explorer default and takes none.
    pub fn explorer_cluster(&self) -> Option<&'static str> {
        match self {
            Network::MainnetBeta => None,
            Network::Localnet => Some("custom"),
            other => Some(other.as_str()),
        }
    }

    /// Guess the cluster from an RPC URL.
    ///
    /// Returns `None` when the URL carries no recognizable hint, in which
    /// case the configured network should be trusted.
    pub fn detect_from_url(url: &str) -> Option<Network> {
        let url = url.to_lowercase();
        if url.contains("localhost") || url.contains("127.0.0.1") || url.contains(":8899") {
            Some(Network::Localnet)
        } else if url.contains("devnet") {
            Some(Network::Devnet)
        } else if url.contains("testnet") {
            Some(Network::Testnet)
        } else if url.contains("mainnet") {
            Some(Network::MainnetBeta)
        } else {
            None
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Network::MainnetBeta),
            "localnet" | "localhost" => Ok(Network::Localnet),
            other => Err(format!("unknown network '{}'", other)),
        }
    }
}
