//! # Emitted Events
//!
//! Every committed mutation appends one or more [`TokenEvent`]s to the
//! service's [`EventLog`]. Rejected operations append nothing. Sequence
//! numbers start at 0 and increase by one per event, so a subscriber that
//! remembers the last sequence it saw can resume with
//! [`EventLog::since`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::{self, Amount};

/// Something observable that a committed operation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenEvent {
    /// Value moved between accounts. Mint uses the null identity as `from`;
    /// burn uses it as `to`.
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "amount::as_string")]
        value: Amount,
    },
    /// An allowance was set.
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "amount::as_string")]
        value: Amount,
    },
    /// The manager forcibly moved funds into its own account.
    ManagerRedeem {
        from: Address,
        manager: Address,
        #[serde(with = "amount::as_string")]
        value: Amount,
    },
    /// The owner replaced the manager.
    ManagerUpdated { previous: Address, new: Address },
    /// The owner handed over ownership.
    OwnershipTransferred { previous: Address, new: Address },
    /// Transfers were blocked.
    Paused { account: Address },
    /// Transfers were re-enabled.
    Unpaused { account: Address },
    /// An account joined the whitelist.
    Whitelisted { account: Address },
}

/// A logged event with its position and wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log.
    pub sequence: u64,
    /// When the event was appended.
    pub emitted_at: DateTime<Utc>,
    /// The event itself.
    pub event: TokenEvent,
}

/// Append-only log of emitted events.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and returns its sequence number.
    pub fn push(&mut self, event: TokenEvent) -> u64 {
        let sequence = self.records.len() as u64;
        self.records.push(EventRecord {
            sequence,
            emitted_at: Utc::now(),
            event,
        });
        sequence
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `sequence >= from`.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    /// At most `limit` records with `sequence >= from`.
    pub fn page(&self, from: u64, limit: usize) -> &[EventRecord] {
        let tail = self.since(from);
        &tail[..limit.min(tail.len())]
    }

    /// The sequence number the next event will receive.
    pub fn next_sequence(&self) -> u64 {
        self.records.len() as u64
    }

    /// The most recently appended event, if any.
    pub fn last(&self) -> Option<&TokenEvent> {
        self.records.last().map(|r| &r.event)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
