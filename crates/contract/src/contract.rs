//! Ledger contract service.
//!
//! A [`SupplyChainContract`] is built fresh for each invocation and holds no
//! state of its own; everything persistent lives in the world state behind
//! the transaction context.

use supplychain_core::{Aggregate, ContractError, ContractResult, Event, LedgerTimestamp};
use supplychain_infra::{ProductRepository, ProductScan, TransactionContext};
use supplychain_products::{
    MANUFACTURED, Product, ProductCommand, ProductEvent, ProductId, ProductPatch, RegisterProduct,
    ReviseProduct, TransferOwnership,
};

use crate::config::{ContractConfig, SeedProduct};

/// Product registry operations for one transaction.
pub struct SupplyChainContract<'a, C: TransactionContext> {
    ctx: &'a C,
    config: &'a ContractConfig,
}

impl<'a, C: TransactionContext> SupplyChainContract<'a, C> {
    pub fn new(ctx: &'a C, config: &'a ContractConfig) -> Self {
        Self { ctx, config }
    }

    fn repository(&self) -> ProductRepository<'a, C::State> {
        ProductRepository::new(self.ctx.state())
    }

    /// Logical time of the executing transaction. Fetched once per operation.
    fn current_timestamp(&self) -> ContractResult<LedgerTimestamp> {
        let raw = self.ctx.tx_timestamp()?;
        LedgerTimestamp::from_tx(raw)
    }

    /// Create the configured seed products, all stamped with the same time.
    ///
    /// Stops at the first failure; earlier writes are left for the host to
    /// discard with the failed transaction.
    pub fn init_ledger(&self) -> ContractResult<()> {
        let now = self.current_timestamp()?;
        for seed in &self.config.seed_products {
            self.register(seed, now)?;
        }
        tracing::info!(seeded = self.config.seed_products.len(), "ledger initialised");
        Ok(())
    }

    pub fn create_product(
        &self,
        id: &str,
        name: &str,
        owner: &str,
        description: &str,
        category: &str,
    ) -> ContractResult<Product> {
        let now = self.current_timestamp()?;
        let seed = SeedProduct::new(id, name, owner, description, category);
        self.register(&seed, now)
    }

    fn register(&self, seed: &SeedProduct, now: LedgerTimestamp) -> ContractResult<Product> {
        let product_id = ProductId::new(seed.id.as_str())?;
        let repo = self.repository();
        if repo.exists(&product_id)? {
            tracing::warn!(product_id = %product_id, "rejecting duplicate registration");
            return Err(ContractError::already_exists(product_id.as_str()));
        }

        let mut product = Product::empty(product_id.clone());
        let events = product.execute(&ProductCommand::RegisterProduct(RegisterProduct {
            product_id,
            name: seed.name.clone(),
            owner: seed.owner.clone(),
            description: seed.description.clone(),
            category: seed.category.clone(),
            status: MANUFACTURED.to_string(),
            occurred_at: now,
        }))?;
        repo.save(&product)?;
        record(&events);
        Ok(product)
    }

    /// Apply a sparse patch. Even an empty patch refreshes `updated_at`.
    pub fn update_product(&self, id: &str, patch: ProductPatch) -> ContractResult<Product> {
        let product_id = ProductId::new(id)?;
        let repo = self.repository();
        let mut product = repo.load(&product_id)?;
        let now = self.current_timestamp()?;

        let events = product.execute(&ProductCommand::ReviseProduct(ReviseProduct {
            product_id,
            patch,
            occurred_at: now,
        }))?;
        repo.save(&product)?;
        record(&events);
        Ok(product)
    }

    pub fn transfer_ownership(&self, id: &str, new_owner: &str) -> ContractResult<Product> {
        let product_id = ProductId::new(id)?;
        let repo = self.repository();
        if !repo.exists(&product_id)? {
            return Err(ContractError::not_found(product_id.as_str()));
        }
        let mut product = repo.load(&product_id)?;
        let now = self.current_timestamp()?;

        let events = product.execute(&ProductCommand::TransferOwnership(TransferOwnership {
            product_id,
            new_owner: new_owner.to_string(),
            occurred_at: now,
        }))?;
        repo.save(&product)?;
        record(&events);
        Ok(product)
    }

    pub fn query_product(&self, id: &str) -> ContractResult<Product> {
        let product_id = ProductId::new(id)?;
        self.repository().load(&product_id)
    }

    pub fn product_exists(&self, id: &str) -> ContractResult<bool> {
        let product_id = ProductId::new(id)?;
        self.repository().exists(&product_id)
    }

    /// Lazy listing of every product in key order.
    ///
    /// Each call starts over from the first key. The sequence ends after the
    /// first error.
    pub fn products(&self) -> ContractResult<ProductScan<'a>> {
        self.repository().scan()
    }

    pub fn get_all_products(&self) -> ContractResult<Vec<Product>> {
        self.products()?.collect()
    }
}

fn record(events: &[ProductEvent]) {
    for event in events {
        let product_id = match event {
            ProductEvent::ProductRegistered(e) => &e.product_id,
            ProductEvent::ProductRevised(e) => &e.product_id,
            ProductEvent::OwnershipTransferred(e) => &e.product_id,
        };
        tracing::info!(
            event_type = event.event_type(),
            event_version = event.version(),
            product_id = %product_id,
            occurred_at = %event.occurred_at(),
            "product change staged"
        );
    }
}
