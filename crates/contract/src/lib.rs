//! Supply-chain product registry contract.
//!
//! [`SupplyChainContract`] holds the business operations; [`router::invoke`]
//! is the string-argument entry point a ledger host calls.

pub mod config;
pub mod contract;
pub mod dto;
pub mod errors;
pub mod router;

pub use config::{ConfigError, ContractConfig, SeedProduct};
pub use contract::SupplyChainContract;
pub use dto::Response;
pub use router::invoke;
