use serde::{Deserialize, Serialize};

use supplychain_core::{Aggregate, ContractError, Entity, Event, LedgerTimestamp};

use crate::patch::ProductPatch;

/// Status every product starts its lifecycle with.
pub const MANUFACTURED: &str = "Manufactured";

/// Product identifier; doubles as the world-state key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Validate and wrap a raw id.
    ///
    /// Empty ids and ids starting with U+0000 (the host's composite-key
    /// namespace) are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, ContractError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ContractError::validation("product id cannot be empty"));
        }
        if id.starts_with('\u{0}') {
            return Err(ContractError::validation(
                "product id cannot start with U+0000",
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductId {
    type Error = ContractError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductId> for String {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

fn stored_record() -> bool {
    true
}

/// Aggregate root: Product.
///
/// Field order is the stored record's field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    status: String,
    owner: String,
    created_at: LedgerTimestamp,
    updated_at: LedgerTimestamp,
    description: String,
    category: String,
    /// False only for the placeholder a registration is decided against.
    #[serde(skip, default = "stored_record")]
    registered: bool,
}

impl Product {
    /// Placeholder for an id that is not on the ledger yet.
    ///
    /// Timestamps are meaningless until a `ProductRegistered` event is applied.
    pub fn empty(id: ProductId) -> Self {
        let epoch = LedgerTimestamp::epoch();
        Self {
            id,
            name: String::new(),
            status: String::new(),
            owner: String::new(),
            created_at: epoch,
            updated_at: epoch,
            description: String::new(),
            category: String::new(),
            registered: false,
        }
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn created_at(&self) -> LedgerTimestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> LedgerTimestamp {
        self.updated_at
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    // updated_at never moves backwards, even if a host hands out an earlier time.
    fn touch(&mut self, at: LedgerTimestamp) {
        self.updated_at = self.updated_at.max(at);
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn storage_key(&self) -> &str {
        self.id.as_str()
    }
}

/// Command: register a new product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterProduct {
    pub product_id: ProductId,
    pub name: String,
    pub owner: String,
    pub description: String,
    pub category: String,
    /// Initial lifecycle status (normally [`MANUFACTURED`]).
    pub status: String,
    pub occurred_at: LedgerTimestamp,
}

/// Command: apply a sparse patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseProduct {
    pub product_id: ProductId,
    pub patch: ProductPatch,
    pub occurred_at: LedgerTimestamp,
}

/// Command: hand the product to a new custodian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOwnership {
    pub product_id: ProductId,
    pub new_owner: String,
    pub occurred_at: LedgerTimestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    RegisterProduct(RegisterProduct),
    ReviseProduct(ReviseProduct),
    TransferOwnership(TransferOwnership),
}

/// Event: ProductRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRegistered {
    pub product_id: ProductId,
    pub name: String,
    pub owner: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub occurred_at: LedgerTimestamp,
}

/// Event: ProductRevised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRevised {
    pub product_id: ProductId,
    pub patch: ProductPatch,
    pub occurred_at: LedgerTimestamp,
}

/// Event: OwnershipTransferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub product_id: ProductId,
    pub previous_owner: String,
    pub new_owner: String,
    pub occurred_at: LedgerTimestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductRegistered(ProductRegistered),
    ProductRevised(ProductRevised),
    OwnershipTransferred(OwnershipTransferred),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductRegistered(_) => "products.product.registered",
            ProductEvent::ProductRevised(_) => "products.product.revised",
            ProductEvent::OwnershipTransferred(_) => "products.product.ownership_transferred",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> LedgerTimestamp {
        match self {
            ProductEvent::ProductRegistered(e) => e.occurred_at,
            ProductEvent::ProductRevised(e) => e.occurred_at,
            ProductEvent::OwnershipTransferred(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = ContractError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductRegistered(e) => {
                self.id = e.product_id.clone();
                self.name = e.name.clone();
                self.status = e.status.clone();
                self.owner = e.owner.clone();
                self.description = e.description.clone();
                self.category = e.category.clone();
                self.created_at = e.occurred_at;
                self.updated_at = e.occurred_at;
                self.registered = true;
            }
            ProductEvent::ProductRevised(e) => {
                let patch = &e.patch;
                if let Some(name) = &patch.name {
                    self.name = name.clone();
                }
                if let Some(status) = &patch.status {
                    self.status = status.clone();
                }
                if let Some(owner) = &patch.owner {
                    self.owner = owner.clone();
                }
                if let Some(description) = &patch.description {
                    self.description = description.clone();
                }
                if let Some(category) = &patch.category {
                    self.category = category.clone();
                }
                self.touch(e.occurred_at);
            }
            ProductEvent::OwnershipTransferred(e) => {
                self.owner = e.new_owner.clone();
                self.touch(e.occurred_at);
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::RegisterProduct(cmd) => self.handle_register(cmd),
            ProductCommand::ReviseProduct(cmd) => self.handle_revise(cmd),
            ProductCommand::TransferOwnership(cmd) => self.handle_transfer(cmd),
        }
    }
}

impl Product {
    fn ensure_product_id(&self, product_id: &ProductId) -> Result<(), ContractError> {
        if &self.id != product_id {
            return Err(ContractError::validation(format!(
                "product_id mismatch (state: {}, command: {})",
                self.id, product_id
            )));
        }
        Ok(())
    }

    fn ensure_registered(&self) -> Result<(), ContractError> {
        if !self.registered {
            return Err(ContractError::not_found(self.id.as_str()));
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterProduct) -> Result<Vec<ProductEvent>, ContractError> {
        if self.registered {
            return Err(ContractError::already_exists(self.id.as_str()));
        }
        self.ensure_product_id(&cmd.product_id)?;

        Ok(vec![ProductEvent::ProductRegistered(ProductRegistered {
            product_id: cmd.product_id.clone(),
            name: cmd.name.clone(),
            owner: cmd.owner.clone(),
            description: cmd.description.clone(),
            category: cmd.category.clone(),
            status: cmd.status.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_revise(&self, cmd: &ReviseProduct) -> Result<Vec<ProductEvent>, ContractError> {
        self.ensure_registered()?;
        self.ensure_product_id(&cmd.product_id)?;
        cmd.patch.validate()?;

        // An empty patch still records the revision so updated_at advances.
        Ok(vec![ProductEvent::ProductRevised(ProductRevised {
            product_id: cmd.product_id.clone(),
            patch: cmd.patch.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_transfer(&self, cmd: &TransferOwnership) -> Result<Vec<ProductEvent>, ContractError> {
        self.ensure_registered()?;
        self.ensure_product_id(&cmd.product_id)?;

        if cmd.new_owner.is_empty() {
            return Err(ContractError::validation("new owner cannot be empty"));
        }

        // Unconditional: transferring to the current owner is still a transfer.
        Ok(vec![ProductEvent::OwnershipTransferred(OwnershipTransferred {
            product_id: cmd.product_id.clone(),
            previous_owner: self.owner.clone(),
            new_owner: cmd.new_owner.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
