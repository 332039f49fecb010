//! Host boundary: world state, transaction context, persistence.
//!
//! Also ships an in-memory simulated ledger host for tests and local runs.

pub mod context;
pub mod repository;
pub mod world_state;

pub use context::{ContextError, TransactionContext};
pub use repository::{ProductRepository, ProductScan};
pub use world_state::{
    CursorGuard, Fault, InMemoryLedger, KeyValue, LedgerTransaction, StateError, StateRangeIter,
    WorldState,
};
