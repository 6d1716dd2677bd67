//! Balance ledger
//!
//! Per-trader, per-ticker free/locked accounting. Every value movement in
//! the exchange passes through here, and the ledger is the sole source of
//! truth for what a trader owns on the exchange.
//!
//! Mutations go through a [`LedgerTx`]: a staging overlay that copies the
//! touched balances, applies checked operations to the copies, and writes
//! them back only on [`LedgerTx::commit`]. Dropping a transaction discards
//! every staged change, which gives calls all-or-nothing semantics.

use std::collections::HashMap;
use types::account::Balance;
use types::errors::LedgerError;
use types::ids::{Address, Ticker};
use types::numeric::Amount;

type BalanceKey = (Address, Ticker);

/// Balance storage keyed by (trader, ticker)
///
/// Entries are created implicitly on first credit and persist afterwards.
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    balances: HashMap<BalanceKey, Balance>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance; zero for pairs never touched
    pub fn balance(&self, trader: &Address, ticker: &Ticker) -> Balance {
        self.balances
            .get(&(trader.clone(), *ticker))
            .copied()
            .unwrap_or_default()
    }

    /// All tickers with an entry for `trader`, in ticker order
    pub fn balances_of(&self, trader: &Address) -> Vec<(Ticker, Balance)> {
        let mut out: Vec<(Ticker, Balance)> = self
            .balances
            .iter()
            .filter(|((owner, _), _)| owner == trader)
            .map(|((_, ticker), balance)| (*ticker, *balance))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Sum of `free + locked` over every trader for `ticker`
    pub fn total_held(&self, ticker: &Ticker) -> Option<Amount> {
        self.balances
            .iter()
            .filter(|((_, t), _)| t == ticker)
            .try_fold(Amount::ZERO, |acc, (_, b)| acc.checked_add(b.total()?))
    }

    /// Start a staged transaction over this ledger
    pub fn begin(&mut self) -> LedgerTx<'_> {
        LedgerTx {
            ledger: self,
            staged: HashMap::new(),
        }
    }

    pub fn credit(&mut self, trader: &Address, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.apply(|tx| tx.credit(trader, ticker, amount))
    }

    pub fn debit_free(&mut self, trader: &Address, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.apply(|tx| tx.debit_free(trader, ticker, amount))
    }

    pub fn lock(&mut self, trader: &Address, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.apply(|tx| tx.lock(trader, ticker, amount))
    }

    pub fn unlock(&mut self, trader: &Address, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.apply(|tx| tx.unlock(trader, ticker, amount))
    }

    pub fn unlock_and_transfer(
        &mut self,
        from: &Address,
        ticker: &Ticker,
        amount: Amount,
        to: &Address,
    ) -> Result<(), LedgerError> {
        self.apply(|tx| tx.unlock_and_transfer(from, ticker, amount, to))
    }

    fn apply<F>(&mut self, op: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&mut LedgerTx<'_>) -> Result<(), LedgerError>,
    {
        let mut tx = self.begin();
        op(&mut tx)?;
        tx.commit();
        Ok(())
    }
}

/// Staged set of balance changes
///
/// Reads see staged values first, then the committed ledger.
#[derive(Debug)]
pub struct LedgerTx<'a> {
    ledger: &'a mut BalanceLedger,
    staged: HashMap<BalanceKey, Balance>,
}

impl<'a> LedgerTx<'a> {
    /// Balance as it would be after commit
    pub fn balance(&self, trader: &Address, ticker: &Ticker) -> Balance {
        self.staged
            .get(&(trader.clone(), *ticker))
            .copied()
            .unwrap_or_else(|| self.ledger.balance(trader, ticker))
    }

    /// Increase `free`
    pub fn credit(&mut self, trader: &Address, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.update(trader, ticker, |b| b.credit(ticker, amount))
    }

    /// Decrease `free`; fails with `InsufficientFree` if short
    pub fn debit_free(&mut self, trader: &Address, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.update(trader, ticker, |b| b.debit_free(ticker, amount))
    }

    /// Move `amount` from `free` to `locked`; fails with `InsufficientFree`
    pub fn lock(&mut self, trader: &Address, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.update(trader, ticker, |b| b.lock(ticker, amount))
    }

    /// Move `amount` from `locked` back to `free`
    pub fn unlock(&mut self, trader: &Address, ticker: &Ticker, amount: Amount) -> Result<(), LedgerError> {
        self.update(trader, ticker, |b| b.unlock(ticker, amount))
    }

    /// Decrease `from.locked` and increase `to.free` by the same amount
    ///
    /// Fails with `InvariantViolation` if `from.locked < amount`.
    pub fn unlock_and_transfer(
        &mut self,
        from: &Address,
        ticker: &Ticker,
        amount: Amount,
        to: &Address,
    ) -> Result<(), LedgerError> {
        self.update(from, ticker, |b| b.debit_locked(ticker, amount))?;
        self.credit(to, ticker, amount)
    }

    /// Write every staged balance back to the ledger
    pub fn commit(self) {
        let LedgerTx { ledger, staged } = self;
        ledger.balances.extend(staged);
    }

    fn update<F>(&mut self, trader: &Address, ticker: &Ticker, op: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&mut Balance) -> Result<(), LedgerError>,
    {
        let mut balance = self.balance(trader, ticker);
        op(&mut balance)?;
        self.staged.insert((trader.clone(), *ticker), balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dai() -> Ticker {
        Ticker::new("DAI").unwrap()
    }

    fn alice() -> Address {
        Address::from("alice")
    }

    fn bob() -> Address {
        Address::from("bob")
    }

    #[test]
    fn test_unknown_pair_is_zero() {
        let ledger = BalanceLedger::new();
        assert_eq!(ledger.balance(&alice(), &dai()), Balance::default());
    }

    #[test]
    fn test_credit_then_lock() {
        let mut ledger = BalanceLedger::new();
        ledger.credit(&alice(), &dai(), Amount::from(1000)).unwrap();
        ledger.lock(&alice(), &dai(), Amount::from(300)).unwrap();

        let balance = ledger.balance(&alice(), &dai());
        assert_eq!(balance.free, Amount::from(700));
        assert_eq!(balance.locked, Amount::from(300));
    }

    #[test]
    fn test_debit_free_insufficient() {
        let mut ledger = BalanceLedger::new();
        ledger.credit(&alice(), &dai(), Amount::from(10)).unwrap();
        let err = ledger.debit_free(&alice(), &dai(), Amount::from(11)).unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientFree { .. }));
        assert_eq!(ledger.balance(&alice(), &dai()).free, Amount::from(10));
    }

    #[test]
    fn test_unlock_and_transfer() {
        let mut ledger = BalanceLedger::new();
        ledger.credit(&alice(), &dai(), Amount::from(500)).unwrap();
        ledger.lock(&alice(), &dai(), Amount::from(300)).unwrap();
        ledger
            .unlock_and_transfer(&alice(), &dai(), Amount::from(200), &bob())
            .unwrap();

        assert_eq!(ledger.balance(&alice(), &dai()), Balance::new(Amount::from(200), Amount::from(100)));
        assert_eq!(ledger.balance(&bob(), &dai()), Balance::new(Amount::from(200), Amount::ZERO));
    }

    #[test]
    fn test_unlock_and_transfer_invariant_violation() {
        let mut ledger = BalanceLedger::new();
        ledger.credit(&alice(), &dai(), Amount::from(500)).unwrap();
        let err = ledger
            .unlock_and_transfer(&alice(), &dai(), Amount::from(1), &bob())
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvariantViolation { .. }));
        assert_eq!(ledger.balance(&bob(), &dai()), Balance::default());
    }

    #[test]
    fn test_dropped_transaction_changes_nothing() {
        let mut ledger = BalanceLedger::new();
        ledger.credit(&alice(), &dai(), Amount::from(100)).unwrap();

        {
            let mut tx = ledger.begin();
            tx.lock(&alice(), &dai(), Amount::from(60)).unwrap();
            tx.credit(&bob(), &dai(), Amount::from(5)).unwrap();
            // second lock fails: only 40 free in the staged view
            assert!(tx.lock(&alice(), &dai(), Amount::from(50)).is_err());
        }

        assert_eq!(ledger.balance(&alice(), &dai()), Balance::new(Amount::from(100), Amount::ZERO));
        assert_eq!(ledger.balance(&bob(), &dai()), Balance::default());
    }

    #[test]
    fn test_transaction_reads_staged_values() {
        let mut ledger = BalanceLedger::new();
        ledger.credit(&alice(), &dai(), Amount::from(100)).unwrap();

        let mut tx = ledger.begin();
        tx.lock(&alice(), &dai(), Amount::from(60)).unwrap();
        assert_eq!(tx.balance(&alice(), &dai()).free, Amount::from(40));
        tx.commit();

        assert_eq!(ledger.balance(&alice(), &dai()).locked, Amount::from(60));
    }

    #[test]
    fn test_total_held_and_balances_of() {
        let mut ledger = BalanceLedger::new();
        let bat = Ticker::new("BAT").unwrap();
        ledger.credit(&alice(), &dai(), Amount::from(100)).unwrap();
        ledger.credit(&bob(), &dai(), Amount::from(50)).unwrap();
        ledger.credit(&alice(), &bat, Amount::from(7)).unwrap();
        ledger.lock(&bob(), &dai(), Amount::from(20)).unwrap();

        assert_eq!(ledger.total_held(&dai()), Some(Amount::from(150)));
        let held = ledger.balances_of(&alice());
        assert_eq!(held.len(), 2);
        assert_eq!(held[0].0, bat);
    }
}
