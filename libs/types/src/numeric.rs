//! Fixed-point amounts for prices and quantities
//!
//! Every monetary value is an unsigned 256-bit integer scaled to one
//! asset-independent decimal convention (18 decimals by default). Arithmetic
//! never wraps: the checked operations return `None` and callers reject the
//! whole call.

use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Default number of decimals for on-chain token amounts.
pub const DEFAULT_DECIMALS: u32 = 18;

/// Unsigned 256-bit token amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(U256);

/// Limit price of an order, in quote units per unit of the traded asset.
pub type Price = Amount;

/// Order size, in units of the traded asset.
pub type Quantity = Amount;

impl Amount {
    pub const ZERO: Amount = Amount(U256::zero());

    pub const fn zero() -> Self {
        Self::ZERO
    }

    pub fn from_u64(value: u64) -> Self {
        Self(U256::from(value))
    }

    pub fn from_u256(value: U256) -> Self {
        Self(value)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `whole * 10^decimals`, or `None` on overflow.
    pub fn scaled(whole: u64, decimals: u32) -> Option<Self> {
        let factor = U256::from(10u64).checked_pow(U256::from(decimals))?;
        U256::from(whole).checked_mul(factor).map(Self)
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_mul(rhs.0).map(Self)
    }

    /// Saturating difference; used only where `self >= rhs` is already known.
    pub fn saturating_sub(self, rhs: Amount) -> Amount {
        Self(self.0.saturating_sub(rhs.0))
    }

    pub fn min(self, rhs: Amount) -> Amount {
        if self <= rhs {
            self
        } else {
            rhs
        }
    }

    /// Render as a human-readable decimal with `decimals` fractional digits.
    ///
    /// Returns `None` when the value does not fit a 96-bit decimal mantissa.
    pub fn to_units(&self, decimals: u32) -> Option<Decimal> {
        if self.0 > U256::from(u128::MAX) {
            return None;
        }
        let raw = i128::try_from(self.0.low_u128()).ok()?;
        Decimal::try_from_i128_with_scale(raw, decimals)
            .ok()
            .map(|d| d.normalize())
    }

    /// Sum a sequence of amounts, failing on overflow.
    pub fn checked_sum<'a>(amounts: impl IntoIterator<Item = &'a Amount>) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(*a))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error parsing a decimal amount string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount: {0}")]
pub struct ParseAmountError(String);

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseAmountError(s.to_string()));
        }
        U256::from_dec_str(s)
            .map(Self)
            .map_err(|_| ParseAmountError(s.to_string()))
    }
}

// Amounts travel as decimal strings: JSON numbers cannot hold 256 bits.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
