//! Exchange deployment configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use types::ids::{Address, Ticker};
use types::numeric::DEFAULT_DECIMALS;

/// Largest scale whose unit (10^decimals) still fits in 256 bits.
pub const MAX_DECIMALS: u32 = 77;

pub const DEFAULT_QUOTE_TICKER: &str = "DAI";

pub const DEFAULT_EXCHANGE_ADDRESS: &str = "dex";

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid quote ticker: {symbol}")]
    InvalidQuoteTicker { symbol: String },

    #[error("Decimals out of range: {decimals}")]
    InvalidDecimals { decimals: u32 },
}

/// Exchange configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexConfig {
    /// Principal allowed to register assets and hand over admin.
    pub admin: Address,
    /// Address the exchange holds custody under.
    #[serde(default = "default_exchange_address")]
    pub exchange_address: Address,
    /// Settlement asset every other asset is priced in.
    #[serde(default = "default_quote_ticker")]
    pub quote_ticker: String,
    /// Fixed-point scale shared by all assets.
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Id given to the first accepted order.
    #[serde(default)]
    pub first_order_id: u64,
}

fn default_exchange_address() -> Address {
    Address::from(DEFAULT_EXCHANGE_ADDRESS)
}

fn default_quote_ticker() -> String {
    DEFAULT_QUOTE_TICKER.to_string()
}

fn default_decimals() -> u32 {
    DEFAULT_DECIMALS
}

impl DexConfig {
    /// Create a config with sensible defaults.
    pub fn new(admin: impl Into<Address>, quote_ticker: &str) -> Self {
        Self {
            admin: admin.into(),
            exchange_address: default_exchange_address(),
            quote_ticker: quote_ticker.to_string(),
            decimals: DEFAULT_DECIMALS,
            first_order_id: 0,
        }
    }

    pub fn with_exchange_address(mut self, exchange: impl Into<Address>) -> Self {
        self.exchange_address = exchange.into();
        self
    }

    pub fn with_first_order_id(mut self, first_order_id: u64) -> Self {
        self.first_order_id = first_order_id;
        self
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.quote()?;
        if self.decimals > MAX_DECIMALS {
            return Err(ConfigError::InvalidDecimals {
                decimals: self.decimals,
            });
        }
        Ok(())
    }

    /// The quote ticker as a fixed-width symbol.
    pub fn quote(&self) -> Result<Ticker, ConfigError> {
        Ticker::new(&self.quote_ticker).map_err(|_| ConfigError::InvalidQuoteTicker {
            symbol: self.quote_ticker.clone(),
        })
    }
}
