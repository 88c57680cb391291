//! olivia-tx command-line tool.
//!
//! Thin wrapper over the library: every command builds an RPC client from
//! the layered configuration (file, `OLIVIA_*` environment, flags) and
//! prints a JSON document on stdout. Logs go to stderr.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use olivia_tx::accounts::{self, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use olivia_tx::config::validation::validate_config;
use olivia_tx::config::{load_or_default, ConfigError, Network, RelayConfig};
use olivia_tx::confirm::{
    check_status, simulate_transaction, ConfirmResult, ConfirmationReport, Confirmer, StatusCheck,
};
use olivia_tx::diagnostics::{classify, log_report, retry_hint, Explorer};
use olivia_tx::observability::init_logging;
use olivia_tx::rpc::{Commitment, HttpRpcClient, Signature, SolanaRpc};
use olivia_tx::tx::{decode_wire, Pubkey, TxSender};

#[derive(Parser)]
#[command(name = "olivia-tx")]
#[command(about = "Submit and confirm Solana transactions reliably", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "OLIVIA_CONFIG")]
    config: Option<PathBuf>,

    /// Cluster (devnet, testnet, mainnet-beta, localnet)
    #[arg(short, long)]
    network: Option<Network>,

    /// Primary RPC URL
    #[arg(long)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a signature once
    Status {
        signature: String,
        #[arg(long)]
        commitment: Option<Commitment>,
    },
    /// Poll a signature until confirmed, failed or timed out
    Wait {
        signature: String,
        #[arg(long)]
        commitment: Option<Commitment>,
        #[arg(long)]
        timeout_ms: Option<u64>,
        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },
    /// Confirm a signature with exponential backoff between attempts
    Confirm {
        signature: String,
        #[arg(long)]
        commitment: Option<Commitment>,
        #[arg(long)]
        max_attempts: Option<u32>,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Show the latest blockhash and block height
    Blockhash,
    /// Submit a signed, base64-encoded transaction
    Send {
        transaction: String,
        /// Simulate before sending
        #[arg(long)]
        simulate: bool,
        /// Wait for confirmation after sending
        #[arg(long)]
        wait: bool,
    },
    /// Simulate a base64-encoded transaction
    Simulate { transaction: String },
    /// Read an account
    Account {
        address: String,
        /// Extract the MXE public key from the account data
        #[arg(long)]
        mxe_key: bool,
        #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
        retries: u32,
    },
    /// Classify a raw error message
    Explain { error: String },
    /// Show the resolved RPC endpoints and explorer
    Endpoints,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    init_logging(&config.observability);

    tracing::debug!(
        network = %config.network,
        primary = %config.primary_rpc_url(),
        fallbacks = config.rpc.fallback_urls.len(),
        "Configuration loaded"
    );

    let explorer = Explorer::from_config(&config);

    match cli.command {
        Commands::Explain { error } => {
            let report = classify(&error);
            let hint = retry_hint(&report);
            print_json(&json!({ "report": report, "hint": hint }))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Endpoints => {
            let detected = Network::detect_from_url(&config.primary_rpc_url());
            print_json(&json!({
                "network": config.network,
                "detected_network": detected,
                "endpoints": config.rpc_endpoints(),
                "recommended_fallbacks": config.network.recommended_fallbacks(),
                "explorer": config.explorer.base_url,
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let rpc: Arc<dyn SolanaRpc> = Arc::new(HttpRpcClient::from_config(&config)?);
            run(command, rpc, &config, &explorer).await
        }
    }
}

async fn run(
    command: Commands,
    rpc: Arc<dyn SolanaRpc>,
    config: &RelayConfig,
    explorer: &Explorer,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let confirmer = Confirmer::new(rpc.clone(), config);

    match command {
        Commands::Status {
            signature,
            commitment,
        } => {
            let signature: Signature = signature.parse()?;
            let commitment = commitment.unwrap_or(config.confirmation.commitment);
            let check = check_status(
                rpc.as_ref(),
                &signature,
                commitment,
                config.confirmation.search_history,
            )
            .await?;
            let error = match &check {
                StatusCheck::Failed(e) => Some(e.clone()),
                _ => None,
            };
            print_json(&json!({
                "signature": signature.to_string(),
                "commitment": commitment,
                "status": check.label(),
                "error": error,
                "explorer_url": explorer.tx_url(&signature),
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Wait {
            signature,
            commitment,
            timeout_ms,
            poll_interval_ms,
        } => {
            let signature: Signature = signature.parse()?;
            let result = confirmer
                .wait_for_transaction(
                    &signature,
                    commitment.unwrap_or(config.confirmation.commitment),
                    timeout_ms.map_or(config.confirmation.timeout(), Duration::from_millis),
                    poll_interval_ms.map_or(config.confirmation.poll_interval(), Duration::from_millis),
                )
                .await;
            report_confirmation(&signature, &result, explorer)
        }
        Commands::Confirm {
            signature,
            commitment,
            max_attempts,
            timeout_ms,
        } => {
            let signature: Signature = signature.parse()?;
            let result = confirmer
                .confirm_with_retry(
                    &signature,
                    commitment.unwrap_or(config.confirmation.commitment),
                    max_attempts.unwrap_or(config.retries.max_attempts),
                    timeout_ms.map_or(config.retries.total_timeout(), Duration::from_millis),
                )
                .await;
            report_confirmation(&signature, &result, explorer)
        }
        Commands::Blockhash => {
            let commitment = config.confirmation.commitment;
            let latest = rpc.get_latest_blockhash(commitment).await?;
            let height = rpc.get_block_height(commitment).await?;
            print_json(&json!({
                "blockhash": latest.blockhash.to_string(),
                "last_valid_block_height": latest.last_valid_block_height,
                "block_height": height,
                "blocks_remaining": latest.last_valid_block_height.saturating_sub(height),
            }))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Send {
            transaction,
            simulate,
            wait,
        } => {
            let transaction = decode_wire(&BASE64_STANDARD.decode(transaction.trim())?)?;
            let sender = TxSender::new(rpc.clone(), config);

            if simulate {
                let outcome = sender.simulate(&transaction).await;
                if !outcome.success && config.simulation.abort_on_error {
                    print_json(&json!({ "simulation": outcome, "sent": false }))?;
                    return Ok(ExitCode::FAILURE);
                }
            }

            let signature = sender.send(&transaction).await?;
            if !wait {
                print_json(&json!({
                    "signature": signature.to_string(),
                    "explorer_url": explorer.tx_url(&signature),
                }))?;
                return Ok(ExitCode::SUCCESS);
            }

            let result = sender.confirmer().wait(&signature).await;
            report_confirmation(&signature, &result, explorer)
        }
        Commands::Simulate { transaction } => {
            let transaction = decode_wire(&BASE64_STANDARD.decode(transaction.trim())?)?;
            let outcome = simulate_transaction(
                rpc.as_ref(),
                &transaction,
                config.confirmation.commitment,
                config.simulation.log_tail,
            )
            .await;
            let code = if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
            print_json(&json!({ "simulation": outcome }))?;
            Ok(code)
        }
        Commands::Account {
            address,
            mxe_key,
            retries,
        } => {
            let address: Pubkey = address.parse()?;
            if mxe_key {
                let key =
                    accounts::read_mxe_public_key(rpc.as_ref(), &address, retries, DEFAULT_RETRY_DELAY)
                        .await?;
                print_json(&json!({
                    "address": address.to_string(),
                    "mxe_public_key": BASE64_STANDARD.encode(key),
                }))?;
            } else {
                let account =
                    accounts::fetch_account_with_retry(rpc.as_ref(), &address, retries, DEFAULT_RETRY_DELAY)
                        .await?;
                print_json(&json!({
                    "address": address.to_string(),
                    "lamports": account.lamports,
                    "owner": account.owner.to_string(),
                    "executable": account.executable,
                    "data_len": account.data.len(),
                    "data": BASE64_STANDARD.encode(&account.data),
                    "explorer_url": explorer.address_url(&address.to_string()),
                }))?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Explain { .. } | Commands::Endpoints => Ok(ExitCode::SUCCESS),
    }
}

/// File, then environment, then flags; validated once more after flags.
fn resolve_config(cli: &Cli) -> Result<RelayConfig, ConfigError> {
    let mut config = load_or_default(cli.config.as_deref())?;

    if let Some(network) = cli.network {
        config.network = network;
    }
    if let Some(url) = &cli.rpc_url {
        config.rpc.primary_url = url.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn report_confirmation(
    signature: &Signature,
    result: &ConfirmResult,
    explorer: &Explorer,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let report = ConfirmationReport::from(result);
    let mut output = json!({
        "signature": signature.to_string(),
        "result": report,
        "explorer_url": explorer.tx_url(signature),
    });

    if let Err(e) = result {
        let diagnosis = classify(&e.to_string());
        log_report(&diagnosis, "confirmation");
        let hint = retry_hint(&diagnosis);
        output["diagnosis"] = json!({ "report": diagnosis, "hint": hint });
    }

    print_json(&output)?;
    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
