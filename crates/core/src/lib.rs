//! `supplychain-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no ledger host concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod timestamp;
pub mod value_object;

pub use aggregate::{Aggregate, Event};
pub use entity::Entity;
pub use error::{ContractError, ContractResult};
pub use id::{ClientId, TxId};
pub use timestamp::{LedgerTimestamp, TxTimestamp};
pub use value_object::ValueObject;
