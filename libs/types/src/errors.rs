//! Error types for the exchange
//!
//! Comprehensive error taxonomy using thiserror. Every failure rejects the
//! whole call; nothing is retried internally.

use thiserror::Error;

/// Balance ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient free balance for {ticker}: required {required}, available {available}")]
    InsufficientFree {
        ticker: String,
        required: String,
        available: String,
    },

    #[error("Locked balance invariant violated for {ticker}: required {required}, locked {available}")]
    InvariantViolation {
        ticker: String,
        required: String,
        available: String,
    },

    #[error("Arithmetic overflow in balance of {ticker}")]
    Overflow { ticker: String },
}

/// Top-level exchange error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Unauthorized: caller is not admin")]
    Unauthorized,

    #[error("Ticker already registered: {ticker}")]
    DuplicateTicker { ticker: String },

    #[error("Unknown ticker: {ticker}")]
    UnknownTicker { ticker: String },

    #[error("Invalid ticker symbol: {symbol:?}")]
    InvalidTicker { symbol: String },

    #[error("Quote asset {ticker} cannot be traded")]
    QuoteAssetNotTradeable { ticker: String },

    #[error("Insufficient {ticker} balance: required {required}, available {available}")]
    InsufficientTokenBalance {
        ticker: String,
        required: String,
        available: String,
    },

    #[error("Insufficient quote balance: required {required}, available {available}")]
    InsufficientQuoteBalance { required: String, available: String },

    #[error("Order book is empty for {ticker}")]
    EmptyOrderBook { ticker: String },

    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: u64 },

    #[error("Caller is not the owner of order {order_id}")]
    NotOrderOwner { order_id: u64 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Limit price must be positive")]
    InvalidPrice,

    #[error("Arithmetic overflow in order value")]
    AmountOverflow,

    #[error("Order id space exhausted")]
    OrderIdExhausted,

    #[error("Address {address} is the exchange custody account")]
    CustodyAddress { address: String },

    #[error("Token transfer failed for {ticker}")]
    TokenTransferFailed { ticker: String },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
