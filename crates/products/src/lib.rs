//! Products domain module.
//!
//! Business rules for the product registry, implemented purely as
//! deterministic domain logic (no ledger access, no clocks).

pub mod patch;
pub mod product;
pub mod record;

pub use patch::ProductPatch;
pub use product::{
    MANUFACTURED, OwnershipTransferred, Product, ProductCommand, ProductEvent, ProductId,
    ProductRegistered, ProductRevised, RegisterProduct, ReviseProduct, TransferOwnership,
};
