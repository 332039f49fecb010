//! Transaction context supplied by the ledger host for one invocation.

use thiserror::Error;

use supplychain_core::{ClientId, ContractError, TxId, TxTimestamp};

use crate::world_state::WorldState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("transaction timestamp unavailable: {0}")]
    TimestampUnavailable(String),
}

impl From<ContextError> for ContractError {
    fn from(value: ContextError) -> Self {
        match value {
            ContextError::TimestampUnavailable(msg) => ContractError::timestamp_unavailable(msg),
        }
    }
}

/// Everything the contract may observe about the executing transaction.
///
/// Implementations must be deterministic: every peer re-executing the same
/// transaction sees the same id, timestamp, identity and state snapshot.
pub trait TransactionContext: Send + Sync {
    type State: WorldState;

    /// World state as seen by this transaction.
    fn state(&self) -> &Self::State;

    fn tx_id(&self) -> &TxId;

    /// Logical transaction time; never a local wall clock.
    fn tx_timestamp(&self) -> Result<TxTimestamp, ContextError>;

    /// Submitting client, when the host exposes one.
    fn client_id(&self) -> Option<&ClientId>;
}
