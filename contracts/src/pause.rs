//! # Pause Gate
//!
//! A two-state switch over transfer-class operations. The token is born
//! `Paused`; the manager lifts it with `unpause` and may drop it again with
//! `pause`. While paused, `transfer` and `transfer_from` fail regardless of
//! whitelist or balance state. Mint, burn, redeem and approve never look at
//! the gate.
//!
//! Authorization is the caller's job (see [`crate::service`]); the gate
//! only tracks state.

use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Current state of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseState {
    /// Transfers blocked.
    Paused,
    /// Transfers allowed.
    Active,
}

impl std::fmt::Display for PauseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PauseState::Paused => write!(f, "Paused"),
            PauseState::Active => write!(f, "Active"),
        }
    }
}

/// The pause switch.
#[derive(Debug, Clone, Serialize)]
pub struct PauseGate {
    state: PauseState,
}

impl PauseGate {
    /// Creates a gate in the `Paused` state.
    pub fn new() -> Self {
        Self {
            state: PauseState::Paused,
        }
    }

    pub fn state(&self) -> PauseState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == PauseState::Paused
    }

    /// `Paused -> Active`.
    ///
    /// # Errors
    ///
    /// [`TokenError::NotPaused`] if already active.
    pub fn unpause(&mut self) -> Result<(), TokenError> {
        if self.state != PauseState::Paused {
            return Err(TokenError::NotPaused);
        }
        self.state = PauseState::Active;
        Ok(())
    }

    /// `Active -> Paused`.
    ///
    /// # Errors
    ///
    /// [`TokenError::AlreadyPaused`] if already paused.
    pub fn pause(&mut self) -> Result<(), TokenError> {
        if self.state == PauseState::Paused {
            return Err(TokenError::AlreadyPaused);
        }
        self.state = PauseState::Paused;
        Ok(())
    }

    /// Fails with [`TokenError::TransfersPaused`] while paused.
    pub fn ensure_active(&self, operation: &'static str) -> Result<(), TokenError> {
        if self.is_paused() {
            return Err(TokenError::TransfersPaused { operation });
        }
        Ok(())
    }
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}
