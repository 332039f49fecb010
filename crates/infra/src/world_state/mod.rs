//! World-state boundary (the host's deterministic key-value store).
//!
//! This module defines the contract-facing abstraction over the ledger's
//! committed state without making any assumptions about durability or
//! replication; those belong to the host.

pub mod in_memory;

pub use in_memory::{Fault, InMemoryLedger, LedgerTransaction};

use std::sync::Arc;

use thiserror::Error;

use supplychain_core::ContractError;

/// Key-value pair returned from range scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Host store failure.
///
/// Key absence is never an error at this level: `get_state` returns `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("state read failed: {0}")]
    Read(String),

    #[error("state write failed: {0}")]
    Write(String),

    #[error("range scan failed: {0}")]
    Scan(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("state lock poisoned")]
    Poisoned,
}

impl From<StateError> for ContractError {
    fn from(value: StateError) -> Self {
        ContractError::store_unavailable(value.to_string())
    }
}

/// Releases a host cursor exactly once.
///
/// Dropping the guard closes the cursor, so every exit path (exhaustion,
/// error, early `break`) releases it.
pub struct CursorGuard<'a> {
    on_close: Option<Box<dyn FnOnce() + Send + 'a>>,
}

impl<'a> CursorGuard<'a> {
    pub fn new(on_close: impl FnOnce() + Send + 'a) -> Self {
        Self {
            on_close: Some(Box::new(on_close)),
        }
    }

    /// Guard for cursors with nothing to release.
    pub fn noop() -> Self {
        Self { on_close: None }
    }

    /// Idempotent.
    pub fn close(&mut self) {
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.on_close.is_none()
    }
}

impl Drop for CursorGuard<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

impl core::fmt::Debug for CursorGuard<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CursorGuard")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Ordered range-scan cursor.
///
/// Finite: it yields at most the entries present when the scan started. Once
/// exhausted (or explicitly closed) it keeps returning `None`.
pub struct StateRangeIter<'a> {
    entries: Box<dyn Iterator<Item = Result<KeyValue, StateError>> + Send + 'a>,
    guard: CursorGuard<'a>,
}

impl<'a> StateRangeIter<'a> {
    pub fn new(
        entries: impl Iterator<Item = Result<KeyValue, StateError>> + Send + 'a,
        guard: CursorGuard<'a>,
    ) -> Self {
        Self {
            entries: Box::new(entries),
            guard,
        }
    }

    pub fn close(&mut self) {
        self.guard.close();
    }

    pub fn is_closed(&self) -> bool {
        self.guard.is_closed()
    }
}

impl Iterator for StateRangeIter<'_> {
    type Item = Result<KeyValue, StateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.guard.is_closed() {
            return None;
        }
        let next = self.entries.next();
        if next.is_none() {
            self.guard.close();
        }
        next
    }
}

impl core::fmt::Debug for StateRangeIter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateRangeIter")
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

/// Deterministic key-value store as seen from inside one transaction.
///
/// All reads are conflict-tracked by the host at commit time; the contract
/// never needs to know how.
pub trait WorldState: Send + Sync {
    /// Point read. `Ok(None)` means the key is definitively absent.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StateError>;

    /// Point write (the full value for `key`).
    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StateError>;

    /// Ordered scan over `[start_key, end_key)`.
    ///
    /// An empty `start_key` / `end_key` leaves that side unbounded, so
    /// `("", "")` covers the whole key space.
    fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<StateRangeIter<'_>, StateError>;
}

impl<S> WorldState for Arc<S>
where
    S: WorldState + ?Sized,
{
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        (**self).get_state(key)
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StateError> {
        (**self).put_state(key, value)
    }

    fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<StateRangeIter<'_>, StateError> {
        (**self).get_state_by_range(start_key, end_key)
    }
}
