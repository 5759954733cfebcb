//! # Transfer Whitelist
//!
//! The set of accounts allowed to appear on either side of a `transfer` or
//! `transfer_from`. Membership only grows. Mint, burn and redeem ignore the
//! whitelist entirely.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::address::Address;
use crate::error::TokenError;

/// Whitelisted accounts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Whitelist {
    members: BTreeSet<Address>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `account`. Returns `true` if it was not already a member.
    pub fn add(&mut self, account: Address) -> bool {
        self.members.insert(account)
    }

    pub fn contains(&self, account: &Address) -> bool {
        self.members.contains(account)
    }

    /// Fails with [`TokenError::NotWhitelisted`] on the first endpoint that
    /// is not a member, checking `from` before `to`.
    pub fn ensure_pair(&self, from: &Address, to: &Address) -> Result<(), TokenError> {
        for account in [from, to] {
            if !self.contains(account) {
                return Err(TokenError::NotWhitelisted { account: *account });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }
}
