//! Asset Registry: admin-curated ticker → token handle mapping
//!
//! Gates every other call: balances, orders and cancellations resolve their
//! ticker here first. The quote asset may be registered (so it can be
//! deposited) but never traded.

use std::collections::HashMap;
use types::asset::Asset;
use types::errors::ExchangeError;
use types::ids::{Address, Ticker};

/// Registered assets in registration order.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    quote: Ticker,
    assets: Vec<Asset>,
    index: HashMap<Ticker, usize>,
}

impl AssetRegistry {
    pub fn new(quote: Ticker) -> Self {
        Self {
            quote,
            assets: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn quote(&self) -> &Ticker {
        &self.quote
    }

    /// Add an asset. Fails with `DuplicateTicker` if already present.
    ///
    /// Caller authorization is checked by the owning contract.
    pub fn register(&mut self, ticker: Ticker, handle: Address) -> Result<&Asset, ExchangeError> {
        if self.index.contains_key(&ticker) {
            return Err(ExchangeError::DuplicateTicker {
                ticker: ticker.to_string(),
            });
        }
        let position = self.assets.len();
        self.assets.push(Asset::new(ticker, handle));
        self.index.insert(ticker, position);
        Ok(&self.assets[position])
    }

    /// Token handle of a registered ticker.
    pub fn resolve(&self, ticker: &Ticker) -> Result<&Address, ExchangeError> {
        self.index
            .get(ticker)
            .map(|&i| &self.assets[i].handle)
            .ok_or_else(|| ExchangeError::UnknownTicker {
                ticker: ticker.to_string(),
            })
    }

    /// Resolve a ticker for order placement: registered and not the quote.
    pub fn ensure_tradeable(&self, ticker: &Ticker) -> Result<(), ExchangeError> {
        self.resolve(ticker)?;
        if *ticker == self.quote {
            return Err(ExchangeError::QuoteAssetNotTradeable {
                ticker: ticker.to_string(),
            });
        }
        Ok(())
    }

    pub fn list_assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn list_tickers(&self) -> Vec<Ticker> {
        self.assets.iter().map(|asset| asset.ticker).collect()
    }
}
