//! # Token Service
//!
//! The composition root. A [`TokenService`] owns one instance of each
//! capability module and is the only way to reach them:
//!
//! ```text
//!   caller ──► TokenService ──► AccessController   (who may do it?)
//!                         ├──► PauseGate          (are transfers open?)
//!                         ├──► Whitelist          (are both ends eligible?)
//!                         └──► Ledger             (can it be afforded? do it)
//! ```
//!
//! Guards always run in that order, and every guard runs before the first
//! write. A failed call returns a [`TokenError`] and leaves the service
//! exactly as it was, event log included.
//!
//! The service is plain owned data: mutations take `&mut self` and views
//! take `&self`. Serializing concurrent callers is the host's job (the node
//! keeps the service behind a single write lock).

use serde::{Deserialize, Serialize};

use crate::access::AccessController;
use crate::address::Address;
use crate::amount::{self, Amount};
use crate::config::{ConfigError, TokenConfig};
use crate::error::TokenError;
use crate::event::{EventLog, EventRecord, TokenEvent};
use crate::ledger::Ledger;
use crate::pause::{PauseGate, PauseState};
use crate::whitelist::Whitelist;

/// Immutable token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// A mutating call, detached from its caller.
///
/// Lets hosts route requests through [`TokenService::execute`] without a
/// method-per-operation dispatch table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    UpdateManager {
        new_manager: Address,
    },
    TransferOwnership {
        new_owner: Address,
    },
    Unpause,
    Pause,
    AddWhitelist {
        account: Address,
    },
    Mint {
        to: Address,
        #[serde(with = "amount::as_string")]
        amount: Amount,
    },
    Burn {
        from: Address,
        #[serde(with = "amount::as_string")]
        amount: Amount,
    },
    ManagerRedeem {
        from: Address,
        #[serde(with = "amount::as_string")]
        amount: Amount,
    },
    Transfer {
        to: Address,
        #[serde(with = "amount::as_string")]
        amount: Amount,
    },
    TransferFrom {
        from: Address,
        to: Address,
        #[serde(with = "amount::as_string")]
        amount: Amount,
    },
    Approve {
        spender: Address,
        #[serde(with = "amount::as_string")]
        amount: Amount,
    },
    IncreaseAllowance {
        spender: Address,
        #[serde(with = "amount::as_string")]
        amount: Amount,
    },
    DecreaseAllowance {
        spender: Address,
        #[serde(with = "amount::as_string")]
        amount: Amount,
    },
}

impl Call {
    /// Stable operation name, used for logging and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Call::UpdateManager { .. } => "update_manager",
            Call::TransferOwnership { .. } => "transfer_ownership",
            Call::Unpause => "unpause",
            Call::Pause => "pause",
            Call::AddWhitelist { .. } => "add_whitelist",
            Call::Mint { .. } => "mint",
            Call::Burn { .. } => "burn",
            Call::ManagerRedeem { .. } => "manager_redeem",
            Call::Transfer { .. } => "transfer",
            Call::TransferFrom { .. } => "transfer_from",
            Call::Approve { .. } => "approve",
            Call::IncreaseAllowance { .. } => "increase_allowance",
            Call::DecreaseAllowance { .. } => "decrease_allowance",
        }
    }
}

/// Borrowed view of every piece of state a call can change, minus the
/// event log. Serializes to a stable shape for before/after comparisons.
#[derive(Debug, Serialize)]
pub struct StateView<'a> {
    pub metadata: &'a TokenMetadata,
    pub access: &'a AccessController,
    pub pause: &'a PauseGate,
    pub whitelist: &'a Whitelist,
    pub ledger: &'a Ledger,
}

/// The permissioned token.
///
/// Serializes for inspection but never deserializes: [`TokenService::new`]
/// is the only constructor, so a null manager or an unbalanced ledger
/// cannot be smuggled in through a document.
///
/// ```compile_fail
/// let doc = r#"{"ledger":{"balances":{},"allowances":{},"total_supply":"5"}}"#;
/// let _svc: jpeth_contracts::TokenService = serde_json::from_str(doc).unwrap();
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct TokenService {
    metadata: TokenMetadata,
    access: AccessController,
    pause: PauseGate,
    whitelist: Whitelist,
    ledger: Ledger,
    events: EventLog,
}

impl TokenService {
    /// Deploys a token: paused, zero supply, empty whitelist.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`TokenConfig::validate`].
    pub fn new(config: TokenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let access = AccessController::new(config.owner, config.manager)
            .map_err(|_| ConfigError::ZeroAddress("owner or manager"))?;

        tracing::info!(
            name = %config.name,
            symbol = %config.symbol,
            decimals = config.decimals,
            owner = %config.owner,
            manager = %config.manager,
            "token deployed"
        );

        Ok(Self {
            metadata: TokenMetadata {
                name: config.name,
                symbol: config.symbol,
                decimals: config.decimals,
            },
            access,
            pause: PauseGate::new(),
            whitelist: Whitelist::new(),
            ledger: Ledger::new(),
            events: EventLog::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    pub fn get_manager(&self) -> Address {
        self.access.manager()
    }

    /// The whitelister. Always the manager.
    pub fn get_whitelister(&self) -> Address {
        self.access.manager()
    }

    pub fn is_owner(&self, account: &Address) -> bool {
        self.access.is_owner(account)
    }

    pub fn is_manager(&self, account: &Address) -> bool {
        self.access.is_manager(account)
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn pause_state(&self) -> PauseState {
        self.pause.state()
    }

    pub fn is_whitelisted(&self, account: &Address) -> bool {
        self.whitelist.contains(account)
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn holder_count(&self) -> usize {
        self.ledger.holder_count()
    }

    /// `true` when total supply equals the sum of balances.
    pub fn is_conserved(&self) -> bool {
        self.ledger.sum_of_balances() == Some(self.ledger.total_supply())
    }

    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    /// Events with `sequence >= from`.
    pub fn events_since(&self, from: u64) -> &[EventRecord] {
        self.events.since(from)
    }

    /// At most `limit` events starting at sequence `from`.
    pub fn events_page(&self, from: u64, limit: usize) -> &[EventRecord] {
        self.events.page(from, limit)
    }

    /// Current state without the event log.
    pub fn state(&self) -> StateView<'_> {
        StateView {
            metadata: &self.metadata,
            access: &self.access,
            pause: &self.pause,
            whitelist: &self.whitelist,
            ledger: &self.ledger,
        }
    }

    /// Sequence number the next emitted event will carry.
    pub fn next_event_sequence(&self) -> u64 {
        self.events.next_sequence()
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Runs `call` on behalf of `caller`.
    pub fn execute(&mut self, caller: Address, call: Call) -> Result<(), TokenError> {
        match call {
            Call::UpdateManager { new_manager } => self.update_manager(caller, new_manager),
            Call::TransferOwnership { new_owner } => self.transfer_ownership(caller, new_owner),
            Call::Unpause => self.unpause(caller),
            Call::Pause => self.pause(caller),
            Call::AddWhitelist { account } => self.add_whitelist(caller, account),
            Call::Mint { to, amount } => self.mint(caller, to, amount),
            Call::Burn { from, amount } => self.burn(caller, from, amount),
            Call::ManagerRedeem { from, amount } => self.manager_redeem(caller, from, amount),
            Call::Transfer { to, amount } => self.transfer(caller, to, amount),
            Call::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, from, to, amount)
            }
            Call::Approve { spender, amount } => self.approve(caller, spender, amount),
            Call::IncreaseAllowance { spender, amount } => {
                self.increase_allowance(caller, spender, amount)
            }
            Call::DecreaseAllowance { spender, amount } => {
                self.decrease_allowance(caller, spender, amount)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Owner operations
    // -----------------------------------------------------------------------

    /// Replaces the manager. Owner only.
    pub fn update_manager(
        &mut self,
        caller: Address,
        new_manager: Address,
    ) -> Result<(), TokenError> {
        let previous = rejected(
            "update_manager",
            &caller,
            self.access.update_manager(&caller, new_manager),
        )?;
        tracing::info!(%previous, new = %new_manager, "manager updated");
        self.events.push(TokenEvent::ManagerUpdated {
            previous,
            new: new_manager,
        });
        Ok(())
    }

    /// Hands ownership to `new_owner`. Owner only.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), TokenError> {
        let previous = rejected(
            "transfer_ownership",
            &caller,
            self.access.transfer_ownership(&caller, new_owner),
        )?;
        tracing::info!(%previous, new = %new_owner, "ownership transferred");
        self.events.push(TokenEvent::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Manager operations
    // -----------------------------------------------------------------------

    /// Opens transfers. Manager only; fails if not paused.
    pub fn unpause(&mut self, caller: Address) -> Result<(), TokenError> {
        rejected("unpause", &caller, self.access.ensure_manager(&caller))?;
        rejected("unpause", &caller, self.pause.unpause())?;
        tracing::info!(account = %caller, "transfers unpaused");
        self.events.push(TokenEvent::Unpaused { account: caller });
        Ok(())
    }

    /// Blocks transfers. Manager only; fails if already paused.
    pub fn pause(&mut self, caller: Address) -> Result<(), TokenError> {
        rejected("pause", &caller, self.access.ensure_manager(&caller))?;
        rejected("pause", &caller, self.pause.pause())?;
        tracing::info!(account = %caller, "transfers paused");
        self.events.push(TokenEvent::Paused { account: caller });
        Ok(())
    }

    /// Adds `account` to the whitelist. Manager only; idempotent.
    pub fn add_whitelist(&mut self, caller: Address, account: Address) -> Result<(), TokenError> {
        rejected("add_whitelist", &caller, self.access.ensure_manager(&caller))?;
        if self.whitelist.add(account) {
            tracing::debug!(%account, "account whitelisted");
            self.events.push(TokenEvent::Whitelisted { account });
        }
        Ok(())
    }

    /// Creates `amount` in `to`. Manager only.
    pub fn mint(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        rejected("mint", &caller, self.access.ensure_manager(&caller))?;
        rejected("mint", &caller, self.ledger.mint(to, amount))?;
        tracing::debug!(%to, amount, supply = self.ledger.total_supply(), "minted");
        self.events.push(TokenEvent::Transfer {
            from: Address::ZERO,
            to,
            value: amount,
        });
        Ok(())
    }

    /// Destroys `amount` held by `from`. Manager only.
    pub fn burn(
        &mut self,
        caller: Address,
        from: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        rejected("burn", &caller, self.access.ensure_manager(&caller))?;
        rejected("burn", &caller, self.ledger.burn(from, amount))?;
        tracing::debug!(%from, amount, supply = self.ledger.total_supply(), "burned");
        self.events.push(TokenEvent::Transfer {
            from,
            to: Address::ZERO,
            value: amount,
        });
        Ok(())
    }

    /// Moves `amount` from `from` into the manager's own account. Manager
    /// only; ignores pause and whitelist.
    pub fn manager_redeem(
        &mut self,
        caller: Address,
        from: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        rejected(
            "manager_redeem",
            &caller,
            self.access.ensure_manager(&caller),
        )?;
        let manager = self.access.manager();
        rejected(
            "manager_redeem",
            &caller,
            self.ledger.transfer("redeem", from, manager, amount),
        )?;
        tracing::debug!(%from, %manager, amount, "redeemed to manager");
        self.events.push(TokenEvent::Transfer {
            from,
            to: manager,
            value: amount,
        });
        self.events.push(TokenEvent::ManagerRedeem {
            from,
            manager,
            value: amount,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Holder operations
    // -----------------------------------------------------------------------

    /// Sends `amount` from the caller to `to`.
    ///
    /// Requires the gate to be open and both ends whitelisted.
    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        rejected("transfer", &caller, self.pause.ensure_active("transfer"))?;
        rejected("transfer", &caller, self.whitelist.ensure_pair(&caller, &to))?;
        rejected(
            "transfer",
            &caller,
            self.ledger.transfer("transfer", caller, to, amount),
        )?;
        tracing::debug!(from = %caller, %to, amount, "transferred");
        self.events.push(TokenEvent::Transfer {
            from: caller,
            to,
            value: amount,
        });
        Ok(())
    }

    /// Sends `amount` from `from` to `to` using the caller's allowance.
    ///
    /// Requires the gate to be open and `from`/`to` whitelisted; the
    /// caller's own whitelist status does not matter.
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        rejected("transfer_from", &caller, self.pause.ensure_active("transfer"))?;
        rejected(
            "transfer_from",
            &caller,
            self.whitelist.ensure_pair(&from, &to),
        )?;
        rejected(
            "transfer_from",
            &caller,
            self.ledger.transfer_from(caller, from, to, amount),
        )?;
        tracing::debug!(spender = %caller, %from, %to, amount, "transferred from");
        self.events.push(TokenEvent::Transfer {
            from,
            to,
            value: amount,
        });
        Ok(())
    }

    /// Sets the caller's allowance for `spender` to exactly `amount`.
    pub fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        rejected("approve", &caller, self.ledger.approve(caller, spender, amount))?;
        self.events.push(TokenEvent::Approval {
            owner: caller,
            spender,
            value: amount,
        });
        Ok(())
    }

    /// Raises the caller's allowance for `spender` by `added`.
    pub fn increase_allowance(
        &mut self,
        caller: Address,
        spender: Address,
        added: Amount,
    ) -> Result<(), TokenError> {
        let value = rejected(
            "increase_allowance",
            &caller,
            self.ledger.increase_allowance(caller, spender, added),
        )?;
        self.events.push(TokenEvent::Approval {
            owner: caller,
            spender,
            value,
        });
        Ok(())
    }

    /// Lowers the caller's allowance for `spender` by `subtracted`.
    pub fn decrease_allowance(
        &mut self,
        caller: Address,
        spender: Address,
        subtracted: Amount,
    ) -> Result<(), TokenError> {
        let value = rejected(
            "decrease_allowance",
            &caller,
            self.ledger.decrease_allowance(caller, spender, subtracted),
        )?;
        self.events.push(TokenEvent::Approval {
            owner: caller,
            spender,
            value,
        });
        Ok(())
    }
}

/// Logs a rejection and passes the result through.
fn rejected<T>(
    operation: &'static str,
    caller: &Address,
    result: Result<T, TokenError>,
) -> Result<T, TokenError> {
    if let Err(e) = &result {
        tracing::debug!(operation, %caller, kind = %e.kind(), error = %e, "operation rejected");
    }
    result
}
