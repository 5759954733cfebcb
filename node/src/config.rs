//! # Node Configuration
//!
//! The node reads a single TOML file:
//!
//! ```toml
//! [token]
//! name = "JpEthStakingFundSp"
//! symbol = "JPETH"
//! manager = "0x..."
//! owner = "0x..."
//! decimals = 6
//!
//! [api]
//! host = "0.0.0.0"
//! event_channel_capacity = 256
//! ```
//!
//! `[token]` carries the deployment parameters and is required. `[api]` is
//! optional; ports come from the CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use jpeth_contracts::{Address, TokenConfig};

/// File name `init` writes and `run` looks for inside the data directory.
pub const CONFIG_FILE_NAME: &str = "token.toml";

/// Default bind host for the API and metrics listeners.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Broadcast channel capacity for live event streaming.
/// Large enough to absorb short bursts without dropping events for
/// connected WebSocket clients.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Contents of `token.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub token: TokenConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// The optional `[api]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

impl NodeConfig {
    /// A config with the default token metadata and the given roles.
    pub fn template(manager: Address, owner: Address) -> Self {
        Self {
            token: TokenConfig::template(manager, owner),
            api: ApiConfig::default(),
        }
    }

    /// Parses and validates TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: NodeConfig = toml::from_str(text).context("malformed token config")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Checks the deployment parameters and the API table.
    pub fn validate(&self) -> Result<()> {
        self.token
            .validate()
            .context("invalid [token] deployment parameters")?;
        if self.api.event_channel_capacity == 0 {
            anyhow::bail!("[api] event_channel_capacity must be positive");
        }
        Ok(())
    }

    /// Renders the config as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to render token config")
    }
}
