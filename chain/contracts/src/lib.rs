//! On-chain Order-Book Exchange Contract
//!
//! This crate implements the contract layer of the exchange: traders deposit
//! registered tokens, trade them against a single quote asset through limit
//! and market orders, and withdraw. Matching and balance accounting live in
//! the `matching-engine` crate; this crate wires them to access control,
//! the asset registry and token custody.
//!
//! # Modules
//! - `config`: Deployment configuration (admin, quote asset, decimals)
//! - `security`: Admin access control
//! - `token`: External ERC-20 style token interface and an in-memory token
//! - `vault`: Token custody (pull on deposit, push on withdrawal)
//! - `registry`: Admin-curated asset registry
//! - `events`: Contract events
//! - `dex`: The exchange facade
//!
//! # Version
//! v0.1.0

pub mod config;
pub mod dex;
pub mod events;
pub mod registry;
pub mod security;
pub mod token;
pub mod vault;

pub use config::{ConfigError, DexConfig};
pub use dex::{BalanceView, Dex};
pub use token::{InMemoryToken, Token};

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
