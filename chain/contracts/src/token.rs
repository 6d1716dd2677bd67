//! External token interface
//!
//! The exchange only ever talks to a registered asset through this trait.
//! Implementations report failure by returning `false`, the way ERC-20
//! contracts do; the caller decides what a failed transfer means.

use std::collections::HashMap;
use std::fmt;
use types::ids::Address;
use types::numeric::Amount;

/// ERC-20 style fungible token
pub trait Token: fmt::Debug {
    /// Address of the token contract; stored as the asset handle.
    fn address(&self) -> &Address;

    fn balance_of(&self, owner: &Address) -> Amount;

    /// Move `amount` from `sender` to `to`.
    fn transfer(&mut self, sender: &Address, to: &Address, amount: Amount) -> bool;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(&mut self, spender: &Address, from: &Address, to: &Address, amount: Amount) -> bool;

    /// Let `spender` move up to `amount` of `owner`'s tokens.
    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> bool;

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;
}

/// Token held entirely in memory
///
/// Used by tests and local simulation in place of a deployed contract.
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    address: Address,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl InMemoryToken {
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: Amount::ZERO,
        }
    }

    /// Create new supply for `to`. Returns `false` on overflow.
    pub fn mint(&mut self, to: &Address, amount: Amount) -> bool {
        let Some(supply) = self.total_supply.checked_add(amount) else {
            return false;
        };
        let Some(balance) = self.balance_of(to).checked_add(amount) else {
            return false;
        };
        self.total_supply = supply;
        self.balances.insert(to.clone(), balance);
        true
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> bool {
        if from == to {
            return self.balance_of(from) >= amount;
        }
        let Some(debited) = self.balance_of(from).checked_sub(amount) else {
            return false;
        };
        let Some(credited) = self.balance_of(to).checked_add(amount) else {
            return false;
        };
        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);
        true
    }
}

impl Token for InMemoryToken {
    fn address(&self) -> &Address {
        &self.address
    }

    fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or(Amount::ZERO)
    }

    fn transfer(&mut self, sender: &Address, to: &Address, amount: Amount) -> bool {
        self.move_balance(sender, to, amount)
    }

    fn transfer_from(&mut self, spender: &Address, from: &Address, to: &Address, amount: Amount) -> bool {
        let Some(remaining) = self.allowance(from, spender).checked_sub(amount) else {
            return false;
        };
        if !self.move_balance(from, to, amount) {
            return false;
        }
        self.allowances.insert((from.clone(), spender.clone()), remaining);
        true
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) -> bool {
        self.allowances.insert((owner.clone(), spender.clone()), amount);
        true
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(Amount::ZERO)
    }
}
