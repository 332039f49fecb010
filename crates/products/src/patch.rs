//! Presence-tagged partial update of a product.

use serde::{Deserialize, Serialize};

use supplychain_core::{ContractError, ContractResult, ValueObject};

/// Sparse patch: `None` leaves a field untouched, `Some(v)` overwrites it.
///
/// `id` and `created_at` are write-once and therefore not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub status: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl ValueObject for ProductPatch {}

fn present(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl ProductPatch {
    /// Build a patch from the string-argument entry point, where an empty
    /// string means "leave unchanged".
    pub fn from_sparse_args(status: &str, owner: &str, description: &str, category: &str) -> Self {
        Self {
            name: None,
            status: present(status),
            owner: present(owner),
            description: present(description),
            category: present(category),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// True when no field would change (the update still refreshes `updated_at`).
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.status.is_none()
            && self.owner.is_none()
            && self.description.is_none()
            && self.category.is_none()
    }

    /// An owner may be replaced but never cleared.
    pub fn validate(&self) -> ContractResult<()> {
        if matches!(self.owner.as_deref(), Some(owner) if owner.is_empty()) {
            return Err(ContractError::validation("owner cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sparse_args_produce_an_empty_patch() {
        let patch = ProductPatch::from_sparse_args("", "", "", "");
        assert!(patch.is_empty());
        assert_eq!(patch, ProductPatch::default());
    }

    #[test]
    fn sparse_args_keep_non_empty_values() {
        let patch = ProductPatch::from_sparse_args("Shipped", "", "Refurbished", "");
        assert_eq!(patch.status.as_deref(), Some("Shipped"));
        assert_eq!(patch.owner, None);
        assert_eq!(patch.description.as_deref(), Some("Refurbished"));
        assert_eq!(patch.category, None);
        assert_eq!(patch.name, None);
    }

    #[test]
    fn explicit_empty_owner_is_rejected() {
        let err = ProductPatch::default().with_owner("").validate().unwrap_err();
        assert!(matches!(err, ContractError::Validation(_)));
    }

    #[test]
    fn explicit_empty_description_is_allowed() {
        let patch = ProductPatch::default().with_description("");
        assert!(patch.validate().is_ok());
        assert!(!patch.is_empty());
    }
}
