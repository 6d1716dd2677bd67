//! Types library for the order-book exchange
//!
//! Core type definitions shared by the matching engine and the contract
//! facade. Everything here is plain data plus checked arithmetic; no module
//! in this crate mutates exchange state on its own.
//!
//! # Modules
//! - `ids`: Identifiers (OrderId, TradeId, Address, Ticker)
//! - `numeric`: 256-bit fixed-point amounts (Amount, Price, Quantity)
//! - `order`: Order lifecycle types
//! - `trade`: Trade execution records
//! - `account`: Free/locked balance per (trader, ticker)
//! - `asset`: Registered asset records
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
pub mod account;
pub mod asset;
pub mod errors;
