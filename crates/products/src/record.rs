//! Stored product record codec.
//!
//! The value stored under a product id is always the complete product as a
//! JSON object with the fields `id, name, status, owner, created_at,
//! updated_at, description, category` (in that order).

use supplychain_core::{ContractError, ContractResult};

use crate::product::Product;

/// Serialize a product into its stored form.
pub fn encode(product: &Product) -> ContractResult<Vec<u8>> {
    serde_json::to_vec(product).map_err(|e| ContractError::encode(e.to_string()))
}

/// Parse a stored record.
///
/// Besides malformed JSON, a record whose `created_at` is later than its
/// `updated_at` is rejected: no transition can have produced it.
pub fn decode(bytes: &[u8]) -> ContractResult<Product> {
    let product: Product =
        serde_json::from_slice(bytes).map_err(|e| ContractError::decode(e.to_string()))?;

    if product.created_at() > product.updated_at() {
        return Err(ContractError::decode(format!(
            "record {} has created_at {} after updated_at {}",
            product.id_typed(),
            product.created_at(),
            product.updated_at()
        )));
    }

    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{MANUFACTURED, ProductCommand, ProductId, RegisterProduct};
    use supplychain_core::{Aggregate, LedgerTimestamp};

    fn laptop(created: i64) -> Product {
        let id = ProductId::new("p1").unwrap();
        let mut product = Product::empty(id.clone());
        product
            .execute(&ProductCommand::RegisterProduct(RegisterProduct {
                product_id: id,
                name: "Laptop".to_string(),
                owner: "CompanyA".to_string(),
                description: "High-end gaming laptop".to_string(),
                category: "Electronics".to_string(),
                status: MANUFACTURED.to_string(),
                occurred_at: LedgerTimestamp::from_unix_seconds(created).unwrap(),
            }))
            .unwrap();
        product
    }

    #[test]
    fn encodes_all_fields_in_record_order() {
        let bytes = encode(&laptop(1_714_564_800)).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            r#"{"id":"p1","name":"Laptop","status":"Manufactured","owner":"CompanyA","created_at":"2024-05-01T12:00:00Z","updated_at":"2024-05-01T12:00:00Z","description":"High-end gaming laptop","category":"Electronics"}"#
        );
    }

    #[test]
    fn decoded_records_count_as_registered() {
        let product = decode(&encode(&laptop(10)).unwrap()).unwrap();
        assert!(product.is_registered());
        assert_eq!(product, laptop(10));
    }

    #[test]
    fn decode_rejects_malformed_bytes() {
        let err = decode(b"not json").unwrap_err();
        assert!(matches!(err, ContractError::Decode(_)));
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let err = decode(br#"{"id":"p1","name":"Laptop"}"#).unwrap_err();
        assert!(matches!(err, ContractError::Decode(_)));
    }

    #[test]
    fn decode_rejects_empty_id() {
        let raw = br#"{"id":"","name":"","status":"","owner":"","created_at":"2024-05-01T12:00:00Z","updated_at":"2024-05-01T12:00:00Z","description":"","category":""}"#;
        assert!(matches!(decode(raw), Err(ContractError::Decode(_))));
    }

    #[test]
    fn decode_rejects_fractional_timestamps() {
        let raw = br#"{"id":"p1","name":"","status":"","owner":"","created_at":"2024-05-01T12:00:00.900Z","updated_at":"2024-05-01T12:00:01Z","description":"","category":""}"#;
        let err = decode(raw).unwrap_err();
        assert!(matches!(err, ContractError::Decode(msg) if msg.contains("sub-second")));
    }

    #[test]
    fn decode_rejects_inverted_timestamps() {
        let raw = br#"{"id":"p1","name":"","status":"","owner":"","created_at":"2024-05-02T00:00:00Z","updated_at":"2024-05-01T00:00:00Z","description":"","category":""}"#;
        let err = decode(raw).unwrap_err();
        assert!(matches!(err, ContractError::Decode(msg) if msg.contains("after updated_at")));
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let raw = br#"{"id":"p1","name":"n","status":"s","owner":"o","created_at":"2024-05-01T12:00:00Z","updated_at":"2024-05-01T12:00:00Z","description":"d","category":"c","batch":"42"}"#;
        let product = decode(raw).unwrap();
        assert_eq!(product.owner(), "o");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use crate::patch::ProductPatch;
        use crate::product::ReviseProduct;
        use proptest::prelude::*;

        proptest! {
            /// Property: decode(encode(p)) == p for arbitrary text, empty strings included.
            #[test]
            fn record_round_trips(
                name in ".{0,32}",
                owner in ".{0,32}",
                status in ".{0,16}",
                description in ".{0,64}",
                category in ".{0,16}",
                created in 0i64..4_000_000_000,
                later in 0i64..1_000_000,
            ) {
                let id = ProductId::new("p1").unwrap();
                let mut product = Product::empty(id.clone());
                product.execute(&ProductCommand::RegisterProduct(RegisterProduct {
                    product_id: id,
                    name: "Laptop".to_string(),
                    owner,
                    description: String::new(),
                    category: String::new(),
                    status: MANUFACTURED.to_string(),
                    occurred_at: LedgerTimestamp::from_unix_seconds(created).unwrap(),
                })).unwrap();
                product.execute(&ProductCommand::ReviseProduct(ReviseProduct {
                    product_id: ProductId::new("p1").unwrap(),
                    patch: ProductPatch::default()
                        .with_name(name)
                        .with_status(status)
                        .with_description(description)
                        .with_category(category),
                    occurred_at: LedgerTimestamp::from_unix_seconds(created + later).unwrap(),
                })).unwrap();

                let decoded = decode(&encode(&product).unwrap()).unwrap();
                prop_assert_eq!(decoded, product);
            }
        }
    }
}
