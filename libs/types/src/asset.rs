//! Registered asset records

use crate::ids::{Address, Ticker};
use serde::{Deserialize, Serialize};

/// A tradeable (or quote) asset: its ticker and the address of the token
/// contract that custodies it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub ticker: Ticker,
    pub handle: Address,
}

impl Asset {
    pub fn new(ticker: Ticker, handle: Address) -> Self {
        Self { ticker, handle }
    }
}
