//! Ask (sell-side) order book
//!
//! Maintains sell order ids sorted by price ascending (best ask first).
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::Price;

use super::price_level::PriceLevel;

/// Ask (sell) side order book
///
/// The lowest ask comes first. At each price level, orders are kept in
/// FIFO order.
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    /// Price levels sorted ascending (lowest price first)
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    /// Create a new empty ask book
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order id at the back of its price level
    pub fn insert(&mut self, price: Price, order_id: OrderId) {
        self.levels.entry(price).or_default().push_back(order_id);
    }

    /// Remove an order from the ask book
    ///
    /// Returns true if the order was found and removed
    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> bool {
        let Some(level) = self.levels.get_mut(&price) else {
            return false;
        };
        if !level.remove(order_id) {
            return false;
        }
        if level.is_empty() {
            self.levels.remove(&price);
        }
        true
    }

    /// Get the best ask price (lowest)
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Id of the order at the front of the best level
    pub fn best_order(&self) -> Option<OrderId> {
        self.levels.values().next().and_then(PriceLevel::front)
    }

    /// All order ids in price-time priority
    pub fn iter(&self) -> impl Iterator<Item = (Price, OrderId)> + '_ {
        self.levels
            .iter()
            .flat_map(|(price, level)| level.iter().map(move |id| (*price, *id)))
    }

    /// Check if the ask book is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Get the total number of price levels
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}
