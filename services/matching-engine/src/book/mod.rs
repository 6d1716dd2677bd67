//! Order book infrastructure module
//!
//! Contains price levels, bid book, ask book, and the per-ticker
//! `OrderBook` that owns the resting orders. Orders live in an arena keyed
//! by id; the bid and ask books are ordered indexes into it, so removal by
//! id never shifts a whole array.

pub mod price_level;
pub mod bid_book;
pub mod ask_book;

pub use price_level::PriceLevel;
pub use bid_book::BidBook;
pub use ask_book::AskBook;

use serde::Serialize;
use std::collections::HashMap;
use types::errors::ExchangeError;
use types::ids::{OrderId, Ticker};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

/// Resting limit orders of one ticker, both sides
///
/// Invariants: every order in the arena is indexed on exactly one side,
/// has `remaining > 0`, and is a limit order.
#[derive(Debug, Clone)]
pub struct OrderBook {
    ticker: Ticker,
    orders: HashMap<OrderId, Order>,
    bids: BidBook,
    asks: AskBook,
}

/// Aggregated view of one price level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepthLevel {
    pub price: Price,
    pub quantity: Quantity,
    pub orders: usize,
}

impl OrderBook {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            orders: HashMap::new(),
            bids: BidBook::new(),
            asks: AskBook::new(),
        }
    }

    /// Insert a resting order behind every order at a better or equal price
    pub fn insert(&mut self, order: Order) {
        debug_assert_eq!(order.ticker, self.ticker);
        match order.side {
            Side::Buy => self.bids.insert(order.price, order.id),
            Side::Sell => self.asks.insert(order.price, order.id),
        }
        self.orders.insert(order.id, order);
    }

    /// Delete an order by identity
    ///
    /// Fails with `OrderNotFound` if the id is not resting on `side`.
    pub fn remove(&mut self, side: Side, order_id: &OrderId) -> Result<Order, ExchangeError> {
        let price = match self.orders.get(order_id) {
            Some(order) if order.side == side => order.price,
            _ => {
                return Err(ExchangeError::OrderNotFound {
                    order_id: order_id.value(),
                })
            }
        };

        let unindexed = match side {
            Side::Buy => self.bids.remove(order_id, price),
            Side::Sell => self.asks.remove(order_id, price),
        };
        debug_assert!(unindexed, "arena and index out of sync");

        self.orders
            .remove(order_id)
            .ok_or(ExchangeError::OrderNotFound {
                order_id: order_id.value(),
            })
    }

    /// Resting order on `side`, if any
    pub fn get(&self, side: Side, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id).filter(|order| order.side == side)
    }

    /// Order at the front of `side` (best price, earliest arrival)
    pub fn best_order(&self, side: Side) -> Option<&Order> {
        let id = match side {
            Side::Buy => self.bids.best_order(),
            Side::Sell => self.asks.best_order(),
        }?;
        self.orders.get(&id)
    }

    /// Orders on `side` in price-time priority
    pub fn iter(&self, side: Side) -> Box<dyn Iterator<Item = &Order> + '_> {
        let ids: Box<dyn Iterator<Item = (Price, OrderId)> + '_> = match side {
            Side::Buy => Box::new(self.bids.iter()),
            Side::Sell => Box::new(self.asks.iter()),
        };
        Box::new(ids.filter_map(move |(_, id)| self.orders.get(&id)))
    }

    /// Full ordered copy of `side`
    pub fn snapshot(&self, side: Side) -> Vec<Order> {
        self.iter(side).cloned().collect()
    }

    /// Append a planned fill to a resting order
    ///
    /// The fill must have been planned against this book, so the maker is
    /// resting on `side` with at least `quantity` left. A fully filled order
    /// is removed from the book and returned.
    pub fn apply_fill(&mut self, side: Side, order_id: &OrderId, quantity: Quantity) -> Option<Order> {
        let Some(order) = self.orders.get_mut(order_id).filter(|order| order.side == side) else {
            debug_assert!(false, "planned maker {order_id} is not resting");
            return None;
        };

        let applied = order.add_fill(quantity);
        debug_assert!(applied, "planned fill exceeds remaining of {order_id}");
        if !order.is_filled() {
            return None;
        }
        self.remove(side, order_id).ok()
    }

    /// Aggregated remaining quantity per price level, best first
    pub fn depth(&self, side: Side) -> Vec<DepthLevel> {
        let mut levels: Vec<DepthLevel> = Vec::new();
        for order in self.iter(side) {
            let remaining = order.remaining();
            match levels.last_mut() {
                Some(level) if level.price == order.price => {
                    level.quantity = level.quantity.checked_add(remaining).unwrap_or(level.quantity);
                    level.orders += 1;
                }
                _ => levels.push(DepthLevel {
                    price: order.price,
                    quantity: remaining,
                    orders: 1,
                }),
            }
        }
        levels
    }

    pub fn is_empty(&self, side: Side) -> bool {
        match side {
            Side::Buy => self.bids.is_empty(),
            Side::Sell => self.asks.is_empty(),
        }
    }

    /// Best price on `side`
    pub fn best_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.bids.best_price(),
            Side::Sell => self.asks.best_price(),
        }
    }
}
