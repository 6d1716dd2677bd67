//! Matching Engine Service
//!
//! Balance ledger, per-ticker order books and price-time priority matching
//! with atomic settlement.
//!
//! **Key Invariants:**
//! - Price-time priority strictly enforced
//! - Deterministic matching (same inputs → same outputs)
//! - Every fill executes at the resting order's price
//! - Conservation of value per asset across every fill
//! - A rejected operation changes no state

pub mod book;
pub mod engine;
pub mod ledger;
pub mod matching;

pub use book::{DepthLevel, OrderBook};
pub use engine::{MatchingEngine, SubmitResult};
pub use ledger::{BalanceLedger, LedgerTx};
