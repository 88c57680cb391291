//! Block explorer links for operator diagnostics.

use crate::config::{Network, RelayConfig};
use crate::rpc::types::Signature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explorer {
    base_url: String,
    network: Network,
}

impl Explorer {
    pub fn new(base_url: impl Into<String>, network: Network) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, network }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.explorer.base_url.clone(), config.network)
    }

    /// `{base}/tx/{signature}?cluster={cluster}`
    pub fn tx_url(&self, signature: &Signature) -> String {
        self.link("tx", &signature.to_string())
    }

    /// `{base}/address/{address}?cluster={cluster}`
    pub fn address_url(&self, address: &str) -> String {
        self.link("address", address)
    }

    fn link(&self, kind: &str, id: &str) -> String {
        match self.network.explorer_cluster() {
            Some(cluster) => format!("{}/{}/{}?cluster={}", self.base_url, kind, id, cluster),
            None => format!("{}/{}/{}", self.base_url, kind, id),
        }
    }
}
