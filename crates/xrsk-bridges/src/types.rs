//! Core data types for bridge records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An upstream catalogue record, kept as an open key/value mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Value);

impl RawRecord {
    /// Look up a key, treating explicit `null` the same as an absent key.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// First non-null value among `keys`, in order.
    pub fn first_of<'a>(&'a self, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
        keys.iter()
            .find_map(|key| self.field(key).map(|value| (*key, value)))
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Bridge identifier as published upstream: an integer or a string.
///
/// Integers order before strings so that sorting a mixed table stays total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BridgeId {
    Int(i64),
    Str(String),
}

impl fmt::Display for BridgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeId::Int(n) => write!(f, "{n}"),
            BridgeId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for BridgeId {
    fn from(n: i64) -> Self {
        BridgeId::Int(n)
    }
}

impl From<&str> for BridgeId {
    fn from(s: &str) -> Self {
        BridgeId::Str(s.to_string())
    }
}

/// The fixed-schema projection of a raw catalogue record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRecord {
    pub id: BridgeId,
    pub name: String,
    /// Locked value, USD.
    pub tvl: f64,
    pub volume_24h: f64,
    pub volume_7d: f64,
    pub volume_30d: f64,
    pub chains: Vec<String>,
    pub chains_count: usize,
    pub last_updated: DateTime<Utc>,
}

impl BridgeRecord {
    /// Field-by-field equality that ignores `last_updated`.
    pub fn same_metrics(&self, other: &BridgeRecord) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.tvl == other.tvl
            && self.volume_24h == other.volume_24h
            && self.volume_7d == other.volume_7d
            && self.volume_30d == other.volume_30d
            && self.chains == other.chains
            && self.chains_count == other.chains_count
    }

    /// Encode back into the upstream key layout.
    pub fn to_raw(&self) -> RawRecord {
        let id = match &self.id {
            BridgeId::Int(n) => Value::from(*n),
            BridgeId::Str(s) => Value::from(s.as_str()),
        };
        RawRecord(serde_json::json!({
            "id": id,
            "displayName": self.name,
            "tvl": self.tvl,
            "last24hVolume": self.volume_24h,
            "weeklyVolume": self.volume_7d,
            "monthlyVolume": self.volume_30d,
            "chains": self.chains,
        }))
    }
}

/// Errors surfaced to callers of the bridge library.
///
/// Transport, protocol, and per-record failures are recovered internally and
/// never appear here.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    #[error("Unknown collector '{name}'. Available: {}", available.join(", "))]
    UnknownCollector {
        name: String,
        available: Vec<String>,
    },

    #[error("argmax over an empty table")]
    EmptyTable,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("CSV error on line {line}: {reason}")]
    Csv { line: usize, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type BridgeResult<T> = Result<T, BridgeError>;
