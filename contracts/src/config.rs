//! # Deployment Parameters
//!
//! A token is deployed once with its name, symbol, owner, manager and
//! decimal precision; none of the metadata can change afterwards. This
//! module holds those parameters and the constants that bound them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

/// Name used by [`TokenConfig::template`].
pub const DEFAULT_NAME: &str = "JpEthStakingFundSp";

/// Symbol used by [`TokenConfig::template`].
pub const DEFAULT_SYMBOL: &str = "JPETH";

/// Decimal precision used by [`TokenConfig::template`]. Six digits, USDC-style.
pub const DEFAULT_DECIMALS: u8 = 6;

/// Largest precision a `u128` raw amount can represent at least one whole
/// unit of (10^38 < 2^128 < 10^39).
pub const MAX_DECIMALS: u8 = 38;

/// Upper bound on the token name, in bytes.
pub const MAX_NAME_LENGTH: usize = 64;

/// Upper bound on the token symbol, in bytes.
pub const MAX_SYMBOL_LENGTH: usize = 16;

/// Reasons a [`TokenConfig`] cannot be deployed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("token name must be 1..=64 bytes, got {0}")]
    InvalidName(usize),

    #[error("token symbol must be 1..=16 bytes, got {0}")]
    InvalidSymbol(usize),

    #[error("decimals must be at most 38, got {0}")]
    DecimalsOutOfRange(u8),

    #[error("{0} is the zero address")]
    ZeroAddress(&'static str),
}

/// The five deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Human-readable name, e.g. "JpEthStakingFundSp".
    pub name: String,
    /// Ticker symbol, e.g. "JPETH".
    pub symbol: String,
    /// Initial manager (and whitelister).
    pub manager: Address,
    /// Owner; the only identity allowed to replace the manager.
    pub owner: Address,
    /// Fractional digits of the raw amount.
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

impl TokenConfig {
    /// Builds a config from the five constructor arguments, in the order the
    /// deploy tooling passes them.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        manager: Address,
        owner: Address,
        decimals: u8,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            manager,
            owner,
            decimals,
        }
    }

    /// The default name/symbol/decimals with the given roles.
    pub fn template(manager: Address, owner: Address) -> Self {
        Self::new(DEFAULT_NAME, DEFAULT_SYMBOL, manager, owner, DEFAULT_DECIMALS)
    }

    /// Checks every parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() || self.name.len() > MAX_NAME_LENGTH {
            return Err(ConfigError::InvalidName(self.name.len()));
        }
        if self.symbol.is_empty() || self.symbol.len() > MAX_SYMBOL_LENGTH {
            return Err(ConfigError::InvalidSymbol(self.symbol.len()));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ConfigError::DecimalsOutOfRange(self.decimals));
        }
        if self.manager.is_zero() {
            return Err(ConfigError::ZeroAddress("manager"));
        }
        if self.owner.is_zero() {
            return Err(ConfigError::ZeroAddress("owner"));
        }
        Ok(())
    }
}
