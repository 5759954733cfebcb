//! # CLI Interface
//!
//! Defines the command-line argument structure for `jpeth-node` using
//! `clap` derive. Supports three subcommands: `run`, `init` and `version`.

use clap::{Parser, Subcommand};
use jpeth_contracts::Address;
use std::path::PathBuf;

/// JPETH token node.
///
/// Hosts a single permissioned token ledger, serves the REST and JSON-RPC
/// API, streams emitted events over WebSocket, and exposes Prometheus
/// metrics.
#[derive(Parser, Debug)]
#[command(
    name = "jpeth-node",
    about = "JPETH permissioned token node",
    version,
    propagate_version = true
)]
pub struct JpethNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy the configured token and start serving it.
    Run(RunArgs),
    /// Create the data directory and write a template `token.toml`.
    Init(InitArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the token configuration file (TOML).
    ///
    /// When omitted, the node looks for `token.toml` in the data directory.
    #[arg(long, short = 'c', env = "JPETH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory holding `token.toml`.
    #[arg(long, short = 'd', env = "JPETH_DATA_DIR", default_value = ".jpeth")]
    pub data_dir: PathBuf,

    /// Port for the JSON-RPC and REST API.
    #[arg(long, env = "JPETH_RPC_PORT", default_value_t = 8645)]
    pub rpc_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "JPETH_METRICS_PORT", default_value_t = 8646)]
    pub metrics_port: u16,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "JPETH_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

impl RunArgs {
    /// The config file to load: `--config` if given, else
    /// `<data_dir>/token.toml`.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.data_dir.join(crate::config::CONFIG_FILE_NAME))
    }
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to the data directory to initialize.
    #[arg(long, short = 'd', env = "JPETH_DATA_DIR", default_value = ".jpeth")]
    pub data_dir: PathBuf,

    /// Initial manager (and whitelister) address, 0x-prefixed hex.
    #[arg(long)]
    pub manager: Address,

    /// Owner address, 0x-prefixed hex.
    #[arg(long)]
    pub owner: Address,

    /// Token name. Defaults to "JpEthStakingFundSp".
    #[arg(long)]
    pub name: Option<String>,

    /// Token symbol. Defaults to "JPETH".
    #[arg(long)]
    pub symbol: Option<String>,

    /// Decimal precision. Defaults to 6.
    #[arg(long)]
    pub decimals: Option<u8>,

    /// Overwrite an existing `token.toml`.
    #[arg(long)]
    pub force: bool,
}
