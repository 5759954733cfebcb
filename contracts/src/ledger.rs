//! # Balance Ledger
//!
//! Owns balances, allowances and total supply, and is the only place value
//! actually moves. The ledger knows nothing about roles, pausing or the
//! whitelist -- [`crate::service::TokenService`] applies those gates before
//! calling in here.
//!
//! ## Invariants
//!
//! - `total_supply == sum(balances)` after every call, successful or not.
//! - Balances and allowances are unsigned; every debit is checked first.
//! - Each method validates everything up front and only then writes, so an
//!   `Err` return means the ledger is untouched.
//!
//! Zero balances and zero allowances are not stored.

use std::collections::HashMap;

use serde::Serialize;

use crate::address::Address;
use crate::amount::Amount;
use crate::error::TokenError;

/// Balance and allowance bookkeeping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ledger {
    balances: HashMap<Address, Amount>,
    /// `owner -> (spender -> allowance)`.
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    total_supply: Amount,
}

impl Ledger {
    /// Creates an empty ledger with zero supply.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Number of accounts with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Recomputes the sum of all balances. `None` on overflow, which would
    /// mean the supply invariant is already broken.
    pub fn sum_of_balances(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b))
    }

    /// Creates `amount` new units in `to`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::ZeroAddress`] if `to` is the null identity.
    /// - [`TokenError::Overflow`] if supply or balance would exceed `u128`.
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::ZeroAddress { role: "mint target" });
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow {
                what: "total supply",
                amount,
            })?;
        // Cannot overflow once the supply did, since balance <= supply.
        let new_balance = self.balance_of(&to) + amount;

        self.total_supply = new_supply;
        self.set_balance(to, new_balance);
        Ok(())
    }

    /// Destroys `amount` units held by `from`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::ZeroAddress`] if `from` is the null identity.
    /// - [`TokenError::InsufficientBalance`] if `amount` exceeds the balance.
    pub fn burn(&mut self, from: Address, amount: Amount) -> Result<(), TokenError> {
        if from.is_zero() {
            return Err(TokenError::ZeroAddress { role: "burn source" });
        }
        let balance = self.balance_of(&from);
        if amount > balance {
            return Err(TokenError::InsufficientBalance {
                operation: "burn",
                account: from,
                balance,
                requested: amount,
            });
        }

        self.set_balance(from, balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Moves `amount` from `from` to `to`. Supply is unchanged.
    ///
    /// `operation` only labels the error message.
    ///
    /// # Errors
    ///
    /// - [`TokenError::ZeroAddress`] if either side is the null identity.
    /// - [`TokenError::InsufficientBalance`] if `amount` exceeds `from`'s balance.
    pub fn transfer(
        &mut self,
        operation: &'static str,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if from.is_zero() {
            return Err(TokenError::ZeroAddress {
                role: "transfer source",
            });
        }
        if to.is_zero() {
            return Err(TokenError::ZeroAddress {
                role: "transfer target",
            });
        }
        let from_balance = self.balance_of(&from);
        if amount > from_balance {
            return Err(TokenError::InsufficientBalance {
                operation,
                account: from,
                balance: from_balance,
                requested: amount,
            });
        }

        if from != to {
            let to_balance = self.balance_of(&to);
            self.set_balance(from, from_balance - amount);
            self.set_balance(to, to_balance + amount);
        }
        Ok(())
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming
    /// the same amount of allowance.
    ///
    /// Allowance is checked before balance.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InsufficientAllowance`] if `amount` exceeds the allowance.
    /// - Anything [`Ledger::transfer`] returns.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(&from, &spender);
        if amount > allowed {
            return Err(TokenError::InsufficientAllowance {
                allowed,
                requested: amount,
            });
        }
        self.transfer("transfer", from, to, amount)?;
        self.set_allowance(from, spender, allowed - amount);
        Ok(())
    }

    /// Overwrites the allowance `owner` grants `spender`.
    ///
    /// # Errors
    ///
    /// [`TokenError::ZeroAddress`] if either party is the null identity.
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if owner.is_zero() {
            return Err(TokenError::ZeroAddress {
                role: "approve owner",
            });
        }
        if spender.is_zero() {
            return Err(TokenError::ZeroAddress {
                role: "approve spender",
            });
        }
        self.set_allowance(owner, spender, amount);
        Ok(())
    }

    /// Raises an allowance and returns the new value.
    pub fn increase_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        added: Amount,
    ) -> Result<Amount, TokenError> {
        let updated = self
            .allowance(&owner, &spender)
            .checked_add(added)
            .ok_or(TokenError::Overflow {
                what: "allowance",
                amount: added,
            })?;
        self.approve(owner, spender, updated)?;
        Ok(updated)
    }

    /// Lowers an allowance and returns the new value.
    ///
    /// # Errors
    ///
    /// [`TokenError::AllowanceUnderflow`] if `subtracted` exceeds the allowance.
    pub fn decrease_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        subtracted: Amount,
    ) -> Result<Amount, TokenError> {
        let allowed = self.allowance(&owner, &spender);
        let updated = allowed
            .checked_sub(subtracted)
            .ok_or(TokenError::AllowanceUnderflow {
                allowed,
                requested: subtracted,
            })?;
        self.approve(owner, spender, updated)?;
        Ok(updated)
    }

    fn set_balance(&mut self, account: Address, amount: Amount) {
        if amount == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, amount);
        }
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: Amount) {
        if amount == 0 {
            if let Some(spenders) = self.allowances.get_mut(&owner) {
                spenders.remove(&spender);
                if spenders.is_empty() {
                    self.allowances.remove(&owner);
                }
            }
        } else {
            self.allowances
                .entry(owner)
                .or_default()
                .insert(spender, amount);
        }
    }
}
