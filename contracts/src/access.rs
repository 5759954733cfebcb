//! # Access Control
//!
//! Two roles, deliberately disjoint in scope:
//!
//! - **Owner** -- may reassign the manager and hand over ownership. Nothing
//!   else.
//! - **Manager** -- holds every operational lever: mint, burn, redeem,
//!   pause control and whitelist membership. The manager is also the
//!   whitelister; the two roles cannot be separated.
//!
//! Reassigning the manager is immediate: the previous manager loses all
//! authority on the very next call.

use serde::Serialize;

use crate::address::Address;
use crate::error::TokenError;

/// Holds the owner and manager identities.
#[derive(Debug, Clone, Serialize)]
pub struct AccessController {
    owner: Address,
    manager: Address,
}

impl AccessController {
    /// Creates the controller.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ZeroAddress`] if either role is the null identity.
    pub fn new(owner: Address, manager: Address) -> Result<Self, TokenError> {
        if owner.is_zero() {
            return Err(TokenError::ZeroAddress { role: "owner" });
        }
        if manager.is_zero() {
            return Err(TokenError::ZeroAddress { role: "manager" });
        }
        Ok(Self { owner, manager })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn manager(&self) -> Address {
        self.manager
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }

    pub fn is_manager(&self, caller: &Address) -> bool {
        *caller == self.manager
    }

    /// Fails with [`TokenError::NotOwner`] unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &Address) -> Result<(), TokenError> {
        if !self.is_owner(caller) {
            return Err(TokenError::NotOwner { caller: *caller });
        }
        Ok(())
    }

    /// Fails with [`TokenError::NotManager`] unless `caller` is the manager.
    pub fn ensure_manager(&self, caller: &Address) -> Result<(), TokenError> {
        if !self.is_manager(caller) {
            return Err(TokenError::NotManager { caller: *caller });
        }
        Ok(())
    }

    /// Replaces the manager and returns the previous one.
    ///
    /// # Errors
    ///
    /// [`TokenError::NotOwner`] if `caller` is not the owner, then
    /// [`TokenError::ZeroAddress`] if `new_manager` is the null identity.
    pub fn update_manager(
        &mut self,
        caller: &Address,
        new_manager: Address,
    ) -> Result<Address, TokenError> {
        self.ensure_owner(caller)?;
        if new_manager.is_zero() {
            return Err(TokenError::ZeroAddress {
                role: "new manager",
            });
        }
        Ok(std::mem::replace(&mut self.manager, new_manager))
    }

    /// Hands ownership to `new_owner` and returns the previous owner.
    ///
    /// # Errors
    ///
    /// [`TokenError::NotOwner`] if `caller` is not the owner, then
    /// [`TokenError::ZeroAddress`] if `new_owner` is the null identity.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, TokenError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TokenError::ZeroAddress { role: "new owner" });
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
