//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::network::Network;
use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the configured network.
pub const NETWORK_ENV_VAR: &str = "OLIVIA_NETWORK";
/// Overrides the primary RPC URL.
pub const RPC_URL_ENV_VAR: &str = "OLIVIA_RPC_URL";
/// Comma-separated list replacing the fallback RPC URLs.
pub const RPC_FALLBACK_ENV_VAR: &str = "OLIVIA_RPC_FALLBACK_URLS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment error: {0}")]
    Env(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, applying environment overrides.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: RelayConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` when given, otherwise start from defaults. Overrides and
/// validation apply either way.
pub fn load_or_default(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = RelayConfig::default();
            apply_env_overrides(&mut config)?;
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Apply `OLIVIA_*` environment variables on top of a parsed config.
pub fn apply_env_overrides(config: &mut RelayConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

fn apply_overrides_from<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(network) = lookup(NETWORK_ENV_VAR).filter(|v| !v.trim().is_empty()) {
        config.network = network
            .parse::<Network>()
            .map_err(|e| ConfigError::Env(format!("{}: {}", NETWORK_ENV_VAR, e)))?;
    }

    if let Some(url) = lookup(RPC_URL_ENV_VAR).filter(|v| !v.trim().is_empty()) {
        config.rpc.primary_url = url.trim().to_string();
    }

    if let Some(list) = lookup(RPC_FALLBACK_ENV_VAR) {
        config.rpc.fallback_urls = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }

    Ok(())
}
