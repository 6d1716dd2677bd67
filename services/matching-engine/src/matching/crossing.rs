//! Crossing detection logic
//!
//! Determines whether an incoming order may consume a resting order at the
//! resting order's price.

use types::numeric::Price;
use types::order::Side;

/// Price limit of an incoming order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceLimit {
    /// Limit order: never trade through this price
    Limit(Price),
    /// Market order: any resting price is acceptable
    Any,
}

/// Check if a bid and ask can match at given prices
///
/// For a buy order to match with a sell order the buy price must be
/// greater than or equal to the sell price.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Check if an incoming order can match against a resting order
///
/// A buy may consume a sell priced at or below its limit; a sell may consume
/// a buy priced at or above its limit. Market orders cross everything.
pub fn incoming_can_match(incoming_side: Side, limit: PriceLimit, resting_price: Price) -> bool {
    match limit {
        PriceLimit::Any => true,
        PriceLimit::Limit(price) => match incoming_side {
            Side::Buy => can_match(price, resting_price),
            Side::Sell => can_match(resting_price, price),
        },
    }
}
