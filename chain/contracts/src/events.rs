//! Contract events
//!
//! Events are immutable records appended by successful state-changing calls.
//! A rejected call emits nothing.

use serde::{Deserialize, Serialize};
use types::ids::{Address, OrderId, Ticker};
use types::numeric::{Amount, Price, Quantity};
use types::order::{OrderKind, Side};
use types::trade::Trade;

/// Asset added to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegistered {
    pub ticker: Ticker,
    pub handle: Address,
}

/// Tokens pulled into custody and credited to free balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub trader: Address,
    pub ticker: Ticker,
    pub amount: Amount,
}

/// Free balance debited and tokens pushed out of custody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub trader: Address,
    pub ticker: Ticker,
    pub amount: Amount,
}

/// Order accepted; emitted before its trades
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub trader: Address,
    pub ticker: Ticker,
    pub side: Side,
    pub kind: OrderKind,
    pub amount: Quantity,
    /// Zero for market orders
    pub price: Price,
}

/// Resting order removed by its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub trader: Address,
    pub ticker: Ticker,
    pub side: Side,
    /// Quantity that was still unfilled
    pub remaining: Quantity,
}

/// Admin role handed over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminChanged {
    pub previous: Address,
    pub current: Address,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    AssetRegistered(AssetRegistered),
    Deposited(Deposited),
    Withdrawn(Withdrawn),
    OrderPlaced(OrderPlaced),
    TradeExecuted(Trade),
    OrderCancelled(OrderCancelled),
    AdminChanged(AdminChanged),
}
