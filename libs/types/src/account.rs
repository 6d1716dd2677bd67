//! Trader balance types
//!
//! A `Balance` is the free/locked split for one (trader, ticker) pair.
//! `free` can be withdrawn or committed to new orders; `locked` backs resting
//! orders and only shrinks through settlement or cancellation.

use crate::ids::Ticker;
use crate::errors::LedgerError;
use crate::numeric::Amount;
use serde::{Deserialize, Serialize};

/// Balance for a single (trader, ticker) pair
///
/// All operations are checked: on error the balance is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    pub free: Amount,
    pub locked: Amount,
}

impl Balance {
    pub fn new(free: Amount, locked: Amount) -> Self {
        Self { free, locked }
    }

    /// `free + locked`, or `None` on overflow
    pub fn total(&self) -> Option<Amount> {
        self.free.checked_add(self.locked)
    }

    /// Credit to free balance (deposit, trade proceeds)
    pub fn credit(&mut self, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.free = self
            .free
            .checked_add(amount)
            .ok_or_else(|| overflow(ticker))?;
        Ok(())
    }

    /// Debit from free balance (withdrawal, market-order payment)
    pub fn debit_free(&mut self, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.free = self
            .free
            .checked_sub(amount)
            .ok_or_else(|| insufficient_free(ticker, amount, self.free))?;
        Ok(())
    }

    /// Move `amount` from free to locked
    pub fn lock(&mut self, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        let free = self
            .free
            .checked_sub(amount)
            .ok_or_else(|| insufficient_free(ticker, amount, self.free))?;
        let locked = self
            .locked
            .checked_add(amount)
            .ok_or_else(|| overflow(ticker))?;
        self.free = free;
        self.locked = locked;
        Ok(())
    }

    /// Move `amount` from locked back to free
    pub fn unlock(&mut self, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        let locked = self.release_locked(ticker, amount)?;
        let free = self
            .free
            .checked_add(amount)
            .ok_or_else(|| overflow(ticker))?;
        self.locked = locked;
        self.free = free;
        Ok(())
    }

    /// Remove `amount` from locked without crediting it anywhere on this
    /// balance; the counterpart is credited to another trader.
    pub fn debit_locked(&mut self, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.locked = self.release_locked(ticker, amount)?;
        Ok(())
    }

    fn release_locked(&self, ticker: &Ticker, amount: Amount) -> Result<Amount, LedgerError> {
        self.locked
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InvariantViolation {
                ticker: ticker.to_string(),
                required: amount.to_string(),
                available: self.locked.to_string(),
            })
    }
}

fn overflow(ticker: &Ticker) -> LedgerError {
    LedgerError::Overflow {
        ticker: ticker.to_string(),
    }
}

fn insufficient_free(ticker: &Ticker, required: Amount, available: Amount) -> LedgerError {
    LedgerError::InsufficientFree {
        ticker: ticker.to_string(),
        required: required.to_string(),
        available: available.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dai() -> Ticker {
        Ticker::new("DAI").unwrap()
    }

    fn funded(free: u64) -> Balance {
        Balance::new(Amount::from(free), Amount::ZERO)
    }

    #[test]
    fn test_balance_lock() {
        let mut balance = funded(1000);
        balance.lock(&dai(), Amount::from(300)).unwrap();

        assert_eq!(balance.free, Amount::from(700));
        assert_eq!(balance.locked, Amount::from(300));
        assert_eq!(balance.total(), Some(Amount::from(1000)));
    }

    #[test]
    fn test_balance_overlock_rejected() {
        let mut balance = funded(100);
        let err = balance.lock(&dai(), Amount::from(150)).unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientFree { .. }));
        assert_eq!(balance, funded(100));
    }

    #[test]
    fn test_balance_unlock() {
        let mut balance = funded(1000);
        balance.lock(&dai(), Amount::from(300)).unwrap();
        balance.unlock(&dai(), Amount::from(100)).unwrap();

        assert_eq!(balance.free, Amount::from(800));
        assert_eq!(balance.locked, Amount::from(200));
    }

    #[test]
    fn test_balance_unlock_more_than_locked() {
        let mut balance = funded(1000);
        balance.lock(&dai(), Amount::from(10)).unwrap();
        let err = balance.unlock(&dai(), Amount::from(11)).unwrap_err();

        assert!(matches!(err, LedgerError::InvariantViolation { .. }));
        assert_eq!(balance.locked, Amount::from(10));
    }

    #[test]
    fn test_balance_debit_locked() {
        let mut balance = funded(1000);
        balance.lock(&dai(), Amount::from(300)).unwrap();
        balance.debit_locked(&dai(), Amount::from(300)).unwrap();

        assert_eq!(balance.locked, Amount::ZERO);
        assert_eq!(balance.total(), Some(Amount::from(700)));
    }

    #[test]
    fn test_balance_debit_free() {
        let mut balance = funded(50);
        assert!(balance.debit_free(&dai(), Amount::from(51)).is_err());
        balance.debit_free(&dai(), Amount::from(50)).unwrap();
        assert_eq!(balance.free, Amount::ZERO);
    }

    #[test]
    fn test_balance_credit_overflow() {
        let mut balance = Balance::new(
            Amount::from_u256(primitive_types::U256::MAX),
            Amount::ZERO,
        );
        let err = balance.credit(&dai(), Amount::from(1)).unwrap_err();
        assert!(matches!(err, LedgerError::Overflow { .. }));
    }
}
