//! Contract error model.

use thiserror::Error;

/// Result type used across the contract layers.
pub type ContractResult<T> = Result<T, ContractError>;

/// Contract-level error.
///
/// Every variant is surfaced to the invoking runtime as-is: there is no local
/// retry and no partial rollback. The host is expected to reject the whole
/// transaction on any error return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// The requested product id is absent from the ledger.
    #[error("product with ID {0} does not exist")]
    NotFound(String),

    /// The product id is already occupied.
    #[error("product with ID {0} already exists")]
    AlreadyExists(String),

    /// Stored bytes could not be parsed as a product record.
    #[error("failed to decode product record: {0}")]
    Decode(String),

    /// A product could not be serialized.
    #[error("failed to encode product record: {0}")]
    Encode(String),

    /// The host key-value store failed for a reason other than key absence.
    #[error("world state unavailable: {0}")]
    StoreUnavailable(String),

    /// The host could not supply a deterministic transaction time.
    #[error("transaction timestamp unavailable: {0}")]
    TimestampUnavailable(String),

    /// Caller input was malformed (empty id, bad arity, unknown function, ...).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl ContractError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists(id.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn timestamp_unavailable(msg: impl Into<String>) -> Self {
        Self::TimestampUnavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable code for error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            ContractError::NotFound(_) => "not_found",
            ContractError::AlreadyExists(_) => "already_exists",
            ContractError::Decode(_) => "decode_error",
            ContractError::Encode(_) => "encode_error",
            ContractError::StoreUnavailable(_) => "store_unavailable",
            ContractError::TimestampUnavailable(_) => "timestamp_unavailable",
            ContractError::Validation(_) => "validation_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_product_id() {
        assert_eq!(
            ContractError::not_found("p9").to_string(),
            "product with ID p9 does not exist"
        );
        assert_eq!(
            ContractError::already_exists("p1").to_string(),
            "product with ID p1 already exists"
        );
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            ContractError::not_found("x"),
            ContractError::already_exists("x"),
            ContractError::decode("x"),
            ContractError::encode("x"),
            ContractError::store_unavailable("x"),
            ContractError::timestamp_unavailable("x"),
            ContractError::validation("x"),
        ];
        let mut codes: Vec<_> = errors.iter().map(ContractError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
