//! Trade execution records
//!
//! One `Trade` per fill. Trades are settled atomically with the call that
//! produced them, so there is no pending-settlement state.

use crate::ids::{Address, OrderId, Ticker, TradeId};
use crate::numeric::{Amount, Price, Quantity};
use crate::order::Side;
use serde::{Deserialize, Serialize};

/// A single match between a resting (maker) order and an incoming (taker)
/// order, executed at the maker's price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub sequence: u64, // Global monotonic sequence
    pub ticker: Ticker,

    // Order references
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,

    // Parties
    pub maker: Address,
    pub taker: Address,

    // Trade details (from taker perspective)
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,

    pub executed_at: i64, // Unix seconds
}

impl Trade {
    /// Quote value exchanged (price × quantity), or `None` on overflow
    pub fn quote_value(&self) -> Option<Amount> {
        self.quantity.checked_mul(self.price)
    }

    /// True when a trader matched their own resting order
    pub fn is_self_match(&self) -> bool {
        self.maker == self.taker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trade {
        Trade {
            trade_id: TradeId::new(),
            sequence: 1,
            ticker: Ticker::new("BAT").unwrap(),
            maker_order_id: OrderId::new(0),
            taker_order_id: OrderId::new(1),
            maker: Address::from("x"),
            taker: Address::from("y"),
            side: Side::Sell,
            price: Amount::from(3),
            quantity: Amount::from(100),
            executed_at: 1_708_123_456,
        }
    }

    #[test]
    fn test_quote_value() {
        assert_eq!(sample().quote_value(), Some(Amount::from(300)));
    }

    #[test]
    fn test_self_match_detection() {
        let mut trade = sample();
        assert!(!trade.is_self_match());
        trade.taker = trade.maker.clone();
        assert!(trade.is_self_match());
    }
}
