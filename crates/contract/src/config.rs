//! Contract configuration.
//!
//! The contract reads no environment of its own; the embedding host hands it
//! a [`ContractConfig`], usually loaded from JSON.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use supplychain_products::ProductId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One product created by `InitLedger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedProduct {
    pub id: String,
    pub name: String,
    pub owner: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

impl SeedProduct {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        owner: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner: owner.into(),
            description: description.into(),
            category: category.into(),
        }
    }
}

/// Only seed data is configurable; new products always start as
/// [`MANUFACTURED`](supplychain_products::MANUFACTURED).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractConfig {
    pub seed_products: Vec<SeedProduct>,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            seed_products: vec![
                SeedProduct::new("p1", "Laptop", "CompanyA", "High-end gaming laptop", "Electronics"),
                SeedProduct::new(
                    "p2",
                    "Smartphone",
                    "CompanyB",
                    "Latest model smartphone",
                    "Electronics",
                ),
            ],
        }
    }
}

impl ContractConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Seed ids must be valid and distinct: a transaction does not read its
    /// own writes, so a duplicate seed would silently overwrite the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for seed in &self.seed_products {
            ProductId::new(seed.id.as_str())
                .map_err(|e| ConfigError::Invalid(format!("seed product: {e}")))?;
            if seed.owner.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "seed product '{}' has no owner",
                    seed.id
                )));
            }
            if !seen.insert(seed.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate seed product id '{}'",
                    seed.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_seeds_the_two_sample_products() {
        let config = ContractConfig::default();
        let ids: Vec<&str> = config.seed_products.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert_eq!(config.seed_products[1].description, "Latest model smartphone");
        config.validate().unwrap();
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let empty = ContractConfig::from_json_str("{}").unwrap();
        assert_eq!(empty, ContractConfig::default());
    }

    #[test]
    fn explicit_empty_seed_list_is_honoured() {
        let config = ContractConfig::from_json_str(r#"{"seed_products": []}"#).unwrap();
        assert!(config.seed_products.is_empty());
    }

    #[test]
    fn initial_status_cannot_be_configured() {
        assert!(matches!(
            ContractConfig::from_json_str(r#"{"initial_status": "Assembled"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn duplicate_seed_ids_are_rejected() {
        let json = r#"{"seed_products": [
            {"id": "p1", "name": "A", "owner": "X"},
            {"id": "p1", "name": "B", "owner": "Y"}
        ]}"#;
        assert!(matches!(
            ContractConfig::from_json_str(json),
            Err(ConfigError::Invalid(msg)) if msg.contains("duplicate")
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            ContractConfig::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            ContractConfig::from_path("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
