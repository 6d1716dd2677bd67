//! Vault: token custody for registered assets
//!
//! Holds the token handle of every registered asset and moves real tokens
//! between traders and the exchange address:
//! - Deposit pulls with `transfer_from(trader -> exchange)`
//! - Withdraw pushes with `transfer(exchange -> trader)`
//!
//! Internal balances live in the ledger; the vault only touches tokens.

use std::collections::HashMap;
use tracing::warn;
use types::errors::ExchangeError;
use types::ids::{Address, Ticker};
use types::numeric::Amount;

use crate::token::Token;

/// Custody of registered token contracts.
#[derive(Debug)]
pub struct Vault {
    /// Address the exchange holds tokens under
    exchange: Address,
    /// Token contract per ticker
    tokens: HashMap<Ticker, Box<dyn Token>>,
}

impl Vault {
    pub fn new(exchange: Address) -> Self {
        Self {
            exchange,
            tokens: HashMap::new(),
        }
    }

    pub fn exchange(&self) -> &Address {
        &self.exchange
    }

    /// Take custody of a token handle. Returns the previous handle if the
    /// ticker already had one.
    pub fn attach(&mut self, ticker: Ticker, token: Box<dyn Token>) -> Option<Box<dyn Token>> {
        self.tokens.insert(ticker, token)
    }

    pub fn token(&self, ticker: &Ticker) -> Result<&dyn Token, ExchangeError> {
        self.tokens
            .get(ticker)
            .map(|token| token.as_ref())
            .ok_or_else(|| unknown(ticker))
    }

    pub fn token_mut(&mut self, ticker: &Ticker) -> Result<&mut (dyn Token + 'static), ExchangeError> {
        match self.tokens.get_mut(ticker) {
            Some(token) => Ok(token.as_mut()),
            None => Err(unknown(ticker)),
        }
    }

    // ───────────────────────── Transfers ─────────────────────────

    /// Pull `amount` from `trader` into custody.
    ///
    /// Needs a prior allowance from `trader` to the exchange address.
    pub fn pull(&mut self, ticker: &Ticker, trader: &Address, amount: Amount) -> Result<(), ExchangeError> {
        let exchange = self.exchange.clone();
        let token = self.token_mut(ticker)?;
        if !token.transfer_from(&exchange, trader, &exchange, amount) {
            warn!(ticker = %ticker, trader = %trader, amount = %amount, "Token pull refused");
            return Err(ExchangeError::TokenTransferFailed {
                ticker: ticker.to_string(),
            });
        }
        Ok(())
    }

    /// Push `amount` out of custody to `trader`.
    pub fn push(&mut self, ticker: &Ticker, trader: &Address, amount: Amount) -> Result<(), ExchangeError> {
        let exchange = self.exchange.clone();
        let token = self.token_mut(ticker)?;
        if !token.transfer(&exchange, trader, amount) {
            warn!(ticker = %ticker, trader = %trader, amount = %amount, "Token push refused");
            return Err(ExchangeError::TokenTransferFailed {
                ticker: ticker.to_string(),
            });
        }
        Ok(())
    }

    // ───────────────────────── Balance Queries ─────────────────────────

    /// Wallet balance of `owner` on the token contract.
    pub fn balance_of(&self, ticker: &Ticker, owner: &Address) -> Result<Amount, ExchangeError> {
        Ok(self.token(ticker)?.balance_of(owner))
    }

    /// Tokens held by the exchange itself.
    pub fn custody_balance(&self, ticker: &Ticker) -> Result<Amount, ExchangeError> {
        self.balance_of(ticker, &self.exchange)
    }
}

fn unknown(ticker: &Ticker) -> ExchangeError {
    ExchangeError::UnknownTicker {
        ticker: ticker.to_string(),
    }
}
