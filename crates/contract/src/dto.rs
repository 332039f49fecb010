use serde::Serialize;
use serde::de::DeserializeOwned;

use supplychain_core::{ContractError, ContractResult};

use crate::errors;

pub const STATUS_OK: u16 = 200;
pub const STATUS_ERROR: u16 = 500;

/// Result of one invocation as handed back to the ledger host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub message: String,
    pub payload: Vec<u8>,
}

impl Response {
    pub fn ok(payload: Vec<u8>) -> Self {
        Self {
            status: STATUS_OK,
            message: String::new(),
            payload,
        }
    }

    pub fn error(err: &ContractError) -> Self {
        // A `Value` built by `json!` always serializes.
        let payload = serde_json::to_vec(&errors::error_payload(err)).unwrap_or_default();
        Self {
            status: STATUS_ERROR,
            message: err.to_string(),
            payload,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Decode the payload as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    /// Machine code of a failed invocation.
    pub fn error_code(&self) -> Option<String> {
        if self.is_ok() {
            return None;
        }
        let body: serde_json::Value = self.json().ok()?;
        body.get("error")?.as_str().map(str::to_string)
    }
}

pub fn to_payload<T: Serialize + ?Sized>(value: &T) -> ContractResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| ContractError::encode(e.to_string()))
}
