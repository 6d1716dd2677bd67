//! Price level implementation with FIFO queue
//!
//! A price level contains all resting orders at a specific price point.
//! Orders are kept in arrival order to enforce time priority within the
//! level. The orders themselves live in the book's arena; a level only
//! holds their ids.

use std::collections::VecDeque;
use types::ids::OrderId;

/// A price level containing order ids at a specific price
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    /// Queue of orders at this price level (FIFO order)
    orders: VecDeque<OrderId>,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an order at the back of the queue (time priority)
    pub fn push_back(&mut self, order_id: OrderId) {
        self.orders.push_back(order_id);
    }

    /// Remove an order by id
    ///
    /// Returns true if the order was found and removed
    pub fn remove(&mut self, order_id: &OrderId) -> bool {
        match self.orders.iter().position(|id| id == order_id) {
            Some(position) => self.orders.remove(position).is_some(),
            None => false,
        }
    }

    /// Peek at the front order without removing it
    pub fn front(&self) -> Option<OrderId> {
        self.orders.front().copied()
    }

    /// Iterate order ids in time priority
    pub fn iter(&self) -> impl Iterator<Item = &OrderId> + '_ {
        self.orders.iter()
    }

    /// Check if the price level is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get the number of orders at this level
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}
