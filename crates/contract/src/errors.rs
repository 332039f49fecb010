use serde_json::json;

use supplychain_core::ContractError;

/// Machine-readable error body: `{"error": code, "message": text}`.
pub fn error_payload(err: &ContractError) -> serde_json::Value {
    json_error(err.code(), err.to_string())
}

pub fn json_error(code: &'static str, message: impl Into<String>) -> serde_json::Value {
    json!({
        "error": code,
        "message": message.into(),
    })
}
