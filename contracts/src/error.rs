//! # Token Errors
//!
//! Every rejected operation surfaces a [`TokenError`]. Each variant belongs
//! to exactly one [`ErrorKind`], which is what callers branch on:
//!
//! - **Authorization** -- the caller lacks the role the operation needs.
//! - **Validation** -- the request itself is malformed or unaffordable
//!   (null target, amount beyond balance or allowance, non-whitelisted
//!   endpoint, arithmetic overflow).
//! - **State** -- the ledger is in a state that forbids the operation
//!   (transfers while paused, pausing twice).
//!
//! A returned error always means nothing was written.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::Amount;

/// Coarse classification of a [`TokenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller lacks the required role.
    Authorization,
    /// Structurally invalid or unaffordable request.
    Validation,
    /// Operation forbidden in the current pause state.
    State,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Authorization => write!(f, "authorization"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::State => write!(f, "state"),
        }
    }
}

/// Errors returned by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Only the owner may perform this operation.
    #[error("caller is not the owner: {caller}")]
    NotOwner {
        /// The rejected caller.
        caller: Address,
    },

    /// Only the manager may perform this operation.
    #[error("caller is not the manager: {caller}")]
    NotManager {
        /// The rejected caller.
        caller: Address,
    },

    /// A role or target was the null identity.
    #[error("{role} is the zero address")]
    ZeroAddress {
        /// What the address was meant to be ("mint target", "new manager", ...).
        role: &'static str,
    },

    /// A debit exceeds the account balance.
    #[error(
        "{operation} amount exceeds balance: balance {balance}, requested {requested} ({account})"
    )]
    InsufficientBalance {
        /// The operation that attempted the debit.
        operation: &'static str,
        /// The account being debited.
        account: Address,
        /// Its balance at the time.
        balance: Amount,
        /// The amount requested.
        requested: Amount,
    },

    /// A delegated transfer exceeds the spender's allowance.
    #[error("insufficient allowance: allowed {allowed}, requested {requested}")]
    InsufficientAllowance {
        /// Current allowance.
        allowed: Amount,
        /// Amount requested.
        requested: Amount,
    },

    /// Decreasing an allowance would take it below zero.
    #[error("decreased allowance below zero: allowed {allowed}, decrease {requested}")]
    AllowanceUnderflow {
        /// Current allowance.
        allowed: Amount,
        /// Requested decrease.
        requested: Amount,
    },

    /// A transfer endpoint is not on the whitelist.
    #[error("account is not whitelisted: {account}")]
    NotWhitelisted {
        /// The offending endpoint.
        account: Address,
    },

    /// A credit would overflow the integer range.
    #[error("{what} overflow: adding {amount}")]
    Overflow {
        /// Which quantity would overflow ("total supply", "balance", "allowance").
        what: &'static str,
        /// The amount that caused it.
        amount: Amount,
    },

    /// Transfer-class operations are blocked while paused.
    #[error("{operation}: paused")]
    TransfersPaused {
        /// The blocked operation.
        operation: &'static str,
    },

    /// `pause` called while already paused.
    #[error("token is already paused")]
    AlreadyPaused,

    /// `unpause` called while not paused.
    #[error("token is not paused")]
    NotPaused,
}

impl TokenError {
    /// Returns the kind this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenError::NotOwner { .. } | TokenError::NotManager { .. } => {
                ErrorKind::Authorization
            }
            TokenError::ZeroAddress { .. }
            | TokenError::InsufficientBalance { .. }
            | TokenError::InsufficientAllowance { .. }
            | TokenError::AllowanceUnderflow { .. }
            | TokenError::NotWhitelisted { .. }
            | TokenError::Overflow { .. } => ErrorKind::Validation,
            TokenError::TransfersPaused { .. }
            | TokenError::AlreadyPaused
            | TokenError::NotPaused => ErrorKind::State,
        }
    }
}
