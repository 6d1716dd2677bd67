//! Matching logic module
//!
//! Implements price-time priority matching and fill settlement

pub mod crossing;
pub mod executor;

pub use crossing::{can_match, PriceLimit};
pub use executor::MatchExecutor;
