//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → OLIVIA_* environment overrides
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → passed by value into RpcClient / Confirmer / TxSender
//! ```
//!
//! # Design Decisions
//! - No process-wide singletons; every component receives its config explicitly
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod network;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use network::Network;
pub use schema::{
    ConfirmationConfig, ExplorerConfig, ObservabilityConfig, RelayConfig, RetryConfig, RpcConfig,
    SendConfig, SimulationConfig,
};
