//! Order lifecycle types
//!
//! An order is created by the matching engine, mutated only by appending
//! fills during settlement, and becomes terminal when fully filled,
//! cancelled, or (for market orders) when the book runs out.

use crate::ids::{Address, OrderId, Ticker};
use crate::numeric::{Amount, Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    /// Rests on the book at its limit price until filled or cancelled
    Limit,
    /// Takes whatever the opposite book offers; never rests
    Market,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Resting, no fills yet
    Open,
    /// Resting with at least one fill
    PartiallyFilled,
    /// Completely matched (terminal)
    Filled,
    /// Cancelled by its owner (terminal)
    Cancelled,
    /// Market order that exhausted the book before its amount (terminal)
    Closed,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Closed
        )
    }
}

/// Entry parameters shared by limit and market orders
///
/// The engine turns an accepted request into an [`Order`] with a fresh id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub trader: Address,
    pub ticker: Ticker,
    pub side: Side,
    pub amount: Quantity,
    /// Block timestamp, Unix seconds
    pub timestamp: i64,
}

impl OrderRequest {
    pub fn new(trader: Address, ticker: Ticker, side: Side, amount: Quantity, timestamp: i64) -> Self {
        Self {
            trader,
            ticker,
            side,
            amount,
            timestamp,
        }
    }
}

/// Complete order structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub ticker: Ticker,
    pub side: Side,
    pub kind: OrderKind,
    pub trader: Address,
    /// Originally requested quantity
    pub amount: Quantity,
    /// Limit price; zero for market orders
    pub price: Price,
    pub fills: Vec<Quantity>,
    pub status: OrderStatus,
    /// Block timestamp, Unix seconds
    pub created_at: i64,
}

impl Order {
    /// Create a new limit order with no fills
    pub fn limit(
        id: OrderId,
        trader: Address,
        ticker: Ticker,
        side: Side,
        amount: Quantity,
        price: Price,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            ticker,
            side,
            kind: OrderKind::Limit,
            trader,
            amount,
            price,
            fills: Vec::new(),
            status: OrderStatus::Open,
            created_at,
        }
    }

    /// Create a new market order with no fills
    pub fn market(
        id: OrderId,
        trader: Address,
        ticker: Ticker,
        side: Side,
        amount: Quantity,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            ticker,
            side,
            kind: OrderKind::Market,
            trader,
            amount,
            price: Amount::ZERO,
            fills: Vec::new(),
            status: OrderStatus::Open,
            created_at,
        }
    }

    /// Sum of all fills
    ///
    /// Fills never exceed `amount` (enforced by `add_fill`), so the sum
    /// cannot overflow.
    pub fn filled(&self) -> Quantity {
        Amount::checked_sum(&self.fills).unwrap_or(self.amount)
    }

    /// `amount - sum(fills)`
    pub fn remaining(&self) -> Quantity {
        self.amount.saturating_sub(self.filled())
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Append a fill and adjust status
    ///
    /// Returns `false` (and leaves the order untouched) if the fill is zero
    /// or would exceed the remaining quantity.
    pub fn add_fill(&mut self, quantity: Quantity) -> bool {
        if quantity.is_zero() || quantity > self.remaining() {
            return false;
        }

        self.fills.push(quantity);
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        true
    }
}
