//! Identifier types for exchange entities
//!
//! Orders carry a monotonic `u64` id handed out by the matching engine.
//! Trades use UUID v7 so they sort chronologically. Traders and token
//! contracts are addressed by an opaque `Address`, and assets by a fixed
//! 32-byte `Ticker`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ExchangeError;

/// Unique identifier for an order
///
/// Allocated from the engine's counter: global across tickers, strictly
/// increasing and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a trade
///
/// Uses UUID v7 for time-based sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(Uuid);

impl TradeId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TradeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account address of a trader, the admin, a token contract or the
/// exchange itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Width of a ticker symbol in bytes.
pub const TICKER_WIDTH: usize = 32;

/// Fixed-width asset symbol (e.g. "DAI", "BAT")
///
/// Stored as 32 zero-padded ASCII bytes. Comparison is exact and
/// case-sensitive: "bat" and "BAT" are different tickers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticker([u8; TICKER_WIDTH]);

impl Ticker {
    /// Build a ticker from an ASCII symbol of 1 to 32 bytes.
    ///
    /// NUL bytes are rejected since they are used as padding.
    pub fn new(symbol: &str) -> Result<Self, ExchangeError> {
        let bytes = symbol.as_bytes();
        let valid = !bytes.is_empty()
            && bytes.len() <= TICKER_WIDTH
            && bytes.iter().all(|b| b.is_ascii() && *b != 0);
        if !valid {
            return Err(ExchangeError::InvalidTicker {
                symbol: symbol.to_string(),
            });
        }

        let mut raw = [0u8; TICKER_WIDTH];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(raw))
    }

    /// The raw padded bytes, as stored on-chain.
    pub fn as_bytes(&self) -> &[u8; TICKER_WIDTH] {
        &self.0
    }

    /// The symbol without padding.
    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|b| *b == 0).unwrap_or(TICKER_WIDTH);
        // Construction only admits ASCII, so this never falls back.
        std::str::from_utf8(&self.0[..len]).unwrap_or_default()
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticker({})", self.as_str())
    }
}

impl FromStr for Ticker {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Ticker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Ticker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        Ticker::new(&symbol).map_err(serde::de::Error::custom)
    }
}
