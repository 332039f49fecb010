//! Product persistence on top of [`WorldState`].
//!
//! Every stored value is a complete product record keyed by the product id;
//! there is no field-level storage and nothing is ever deleted.

use supplychain_core::{ContractError, ContractResult, Entity};
use supplychain_products::{Product, ProductId, record};

use crate::world_state::{StateRangeIter, WorldState};

/// Reads and writes products through a borrowed world state.
#[derive(Debug)]
pub struct ProductRepository<'a, S: ?Sized> {
    state: &'a S,
}

impl<'a, S> ProductRepository<'a, S>
where
    S: WorldState + ?Sized,
{
    pub fn new(state: &'a S) -> Self {
        Self { state }
    }

    /// `false` only when the key is definitively absent.
    pub fn exists(&self, id: &ProductId) -> ContractResult<bool> {
        let raw = self.state.get_state(id.as_str())?;
        Ok(raw.is_some())
    }

    /// Load and decode; `NotFound` when absent.
    pub fn load(&self, id: &ProductId) -> ContractResult<Product> {
        self.find(id)?
            .ok_or_else(|| ContractError::not_found(id.as_str()))
    }

    pub fn find(&self, id: &ProductId) -> ContractResult<Option<Product>> {
        match self.state.get_state(id.as_str())? {
            Some(bytes) => decode_at(id.as_str(), &bytes).map(Some),
            None => {
                tracing::debug!(product_id = %id, "product not on ledger");
                Ok(None)
            }
        }
    }

    /// Write the full record under the product's key.
    pub fn save(&self, product: &Product) -> ContractResult<()> {
        let bytes = record::encode(product)?;
        self.state.put_state(product.storage_key(), bytes)?;
        tracing::debug!(product_id = %product.id_typed(), "product record written");
        Ok(())
    }

    /// Lazily decode every record in the key space.
    ///
    /// Each call opens a fresh cursor, so a listing can always be restarted
    /// from the beginning.
    pub fn scan(&self) -> ContractResult<ProductScan<'a>> {
        let cursor = self.state.get_state_by_range("", "")?;
        Ok(ProductScan {
            cursor,
            failed: false,
        })
    }
}

fn decode_at(key: &str, bytes: &[u8]) -> ContractResult<Product> {
    let product = record::decode(bytes)?;
    if product.storage_key() != key {
        return Err(ContractError::decode(format!(
            "record stored under '{key}' carries id '{}'",
            product.id_typed()
        )));
    }
    Ok(product)
}

/// Finite, fused sequence of decoded products.
///
/// The first failure (scan or decode) is yielded once and ends the sequence;
/// corrupt entries are never skipped. The cursor is released when the
/// sequence ends, on error, or when the scan is dropped early.
#[derive(Debug)]
pub struct ProductScan<'a> {
    cursor: StateRangeIter<'a>,
    failed: bool,
}

impl ProductScan<'_> {
    fn fail(&mut self, err: ContractError) -> Option<ContractResult<Product>> {
        self.failed = true;
        self.cursor.close();
        Some(Err(err))
    }
}

impl Iterator for ProductScan<'_> {
    type Item = ContractResult<Product>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.cursor.next()? {
            Ok(kv) => match decode_at(&kv.key, &kv.value) {
                Ok(product) => Some(Ok(product)),
                Err(err) => {
                    tracing::warn!(key = %kv.key, error = %err, "aborting scan on undecodable record");
                    self.fail(err)
                }
            },
            Err(err) => self.fail(err.into()),
        }
    }
}
