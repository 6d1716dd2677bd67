//! Access control for admin-gated contract calls
//!
//! The exchange has a single administrative principal, taken from
//! configuration. Registry mutation and admin handover check the caller
//! against it.

use types::errors::ExchangeError;
use types::ids::Address;

/// Single-principal access control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControl {
    admin: Address,
}

impl AccessControl {
    /// Create access control with an initial admin.
    pub fn new(admin: Address) -> Self {
        Self { admin }
    }

    /// Check if a caller is admin.
    pub fn is_admin(&self, caller: &Address) -> bool {
        self.admin == *caller
    }

    /// Fail with `Unauthorized` unless the caller is admin.
    pub fn ensure_admin(&self, caller: &Address) -> Result<(), ExchangeError> {
        if !self.is_admin(caller) {
            return Err(ExchangeError::Unauthorized);
        }
        Ok(())
    }

    /// Hand the admin role to a new principal. Returns the previous admin.
    pub fn transfer_admin(
        &mut self,
        caller: &Address,
        new_admin: Address,
    ) -> Result<Address, ExchangeError> {
        self.ensure_admin(caller)?;
        Ok(std::mem::replace(&mut self.admin, new_admin))
    }

    /// Get the current admin identifier.
    pub fn admin(&self) -> &Address {
        &self.admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_control_admin() {
        let ac = AccessControl::new(Address::from("alice"));
        assert!(ac.is_admin(&Address::from("alice")));
        assert!(!ac.is_admin(&Address::from("bob")));
    }

    #[test]
    fn test_ensure_admin_rejects_others() {
        let ac = AccessControl::new(Address::from("alice"));
        assert_eq!(ac.ensure_admin(&Address::from("alice")), Ok(()));
        assert_eq!(
            ac.ensure_admin(&Address::from("eve")),
            Err(ExchangeError::Unauthorized)
        );
    }

    #[test]
    fn test_access_control_transfer_admin() {
        let mut ac = AccessControl::new(Address::from("alice"));
        let previous = ac
            .transfer_admin(&Address::from("alice"), Address::from("bob"))
            .unwrap();

        assert_eq!(previous, Address::from("alice"));
        assert!(ac.is_admin(&Address::from("bob")));
        assert!(!ac.is_admin(&Address::from("alice")));
        assert_eq!(ac.admin(), &Address::from("bob"));
    }

    #[test]
    fn test_transfer_admin_unauthorized() {
        let mut ac = AccessControl::new(Address::from("alice"));
        let result = ac.transfer_admin(&Address::from("eve"), Address::from("eve"));
        assert_eq!(result, Err(ExchangeError::Unauthorized));
        assert_eq!(ac.admin(), &Address::from("alice"));
    }
}
