//! # JPETH Permissioned Ledger
//!
//! State-transition logic for a single issuer-controlled token whose
//! movement is gated by roles, a pause switch and a transfer whitelist.
//! The crate is the accounting engine only: callers arrive with an
//! already-authenticated [`Address`], and hosting (HTTP, persistence of
//! deployment parameters) lives in `jpeth-node`.
//!
//! ## Modules
//!
//! - **access**: owner and manager roles.
//! - **pause**: the `Paused`/`Active` gate over transfers.
//! - **whitelist**: accounts eligible for transfer and transferFrom.
//! - **ledger**: balances, allowances, total supply.
//! - **service**: [`TokenService`], the composition root that applies the
//!   gates in order and then moves value.
//!
//! ## Design Principles
//!
//! 1. Money arithmetic is checked. A debit is compared against the balance
//!    before anything is written; credits use `checked_add`.
//! 2. Every guard runs before the first write, so a failed call has no
//!    observable effect.
//! 3. `total_supply` always equals the sum of balances. Only mint raises it
//!    and only burn lowers it.
//! 4. Every public type is serializable (serde) for wire transport.

pub mod access;
pub mod address;
pub mod amount;
pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod pause;
pub mod service;
pub mod whitelist;

pub use address::Address;
pub use amount::Amount;
pub use config::{ConfigError, TokenConfig};
pub use error::{ErrorKind, TokenError};
pub use event::{EventRecord, TokenEvent};
pub use service::{Call, StateView, TokenService};
