//! Logical (transaction) time.
//!
//! The ledger host hands every transaction a `(seconds, nanos)` pair that is
//! identical for all parties re-executing it. The contract never reads a wall
//! clock; it only ever formats this value.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ContractError, ContractResult};
use crate::value_object::ValueObject;

/// Raw transaction time as supplied by the host (protobuf `Timestamp` shape).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxTimestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl TxTimestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }
}

/// Deterministic timestamp recorded on products (`created_at` / `updated_at`).
///
/// Stored with whole-second precision and rendered as RFC 3339 in UTC with a
/// `Z` suffix, e.g. `2024-05-01T12:00:00Z`. Sub-second parts of the host value
/// are truncated so that the rendered string and the in-memory value always
/// describe the same instant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerTimestamp(DateTime<Utc>);

impl ValueObject for LedgerTimestamp {}

impl LedgerTimestamp {
    /// Convert a host transaction time.
    ///
    /// Fails with `TimestampUnavailable` when nanos are out of range or the
    /// instant cannot be represented.
    pub fn from_tx(ts: TxTimestamp) -> ContractResult<Self> {
        if !(0..1_000_000_000).contains(&ts.nanos) {
            return Err(ContractError::timestamp_unavailable(format!(
                "nanos out of range: {}",
                ts.nanos
            )));
        }
        Self::from_unix_seconds(ts.seconds)
    }

    /// `1970-01-01T00:00:00Z`.
    pub fn epoch() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn from_unix_seconds(seconds: i64) -> ContractResult<Self> {
        DateTime::<Utc>::from_timestamp(seconds, 0)
            .map(Self)
            .ok_or_else(|| {
                ContractError::timestamp_unavailable(format!("unrepresentable instant: {seconds}s"))
            })
    }

    /// Parse the fixed string form (any RFC 3339 offset is normalised to UTC).
    ///
    /// A non-zero fractional second is a `Decode` error: stored values are
    /// whole seconds, and truncating would change the record on re-encode.
    pub fn parse(s: &str) -> ContractResult<Self> {
        let parsed = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ContractError::decode(format!("invalid timestamp '{s}': {e}")))?;
        if parsed.timestamp_subsec_nanos() != 0 {
            return Err(ContractError::decode(format!(
                "timestamp '{s}' has sub-second precision"
            )));
        }
        Self::from_unix_seconds(parsed.timestamp())
            .map_err(|e| ContractError::decode(e.to_string()))
    }

    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Fixed RFC 3339 rendering used in stored records.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl core::fmt::Display for LedgerTimestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for LedgerTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for LedgerTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        LedgerTimestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}
