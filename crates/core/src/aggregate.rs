//! Aggregate execution semantics for ledger entities.

use crate::entity::Entity;
use crate::timestamp::LedgerTimestamp;

/// A fact produced by an aggregate decision.
///
/// Events are immutable and carry the logical time of the transaction that
/// produced them. They are not persisted by the contract; the stored record is
/// always the full entity state.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "products.product.registered").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// Logical transaction time the event happened at.
    fn occurred_at(&self) -> LedgerTimestamp;
}

/// Pure, deterministic decision + evolution.
///
/// - **Decision logic**: `handle(&self, cmd)` returns events.
/// - **State mutation**: `apply(&mut self, event)` evolves state.
///
/// Aggregates must not perform IO or read clocks: every validating peer has to
/// reach the same events from the same state and command.
pub trait Aggregate: Entity {
    type Command: Clone + core::fmt::Debug;
    type Event: Event;
    type Error: core::fmt::Debug;

    /// Evolve in-memory state from a single event.
    fn apply(&mut self, event: &Self::Event);

    /// Decide which events to emit given the current state and a command.
    ///
    /// This must not mutate state. State evolution is done through `apply`.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// `handle` followed by `apply` for each resulting event.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}
