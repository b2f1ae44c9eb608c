//! Projection of raw catalogue records into [`BridgeRecord`].
//!
//! Field selection:
//!
//! | Output | Source keys, in priority order | Default |
//! |---|---|---|
//! | `name` | `displayName`, `name` (first non-empty) | `"Unknown"` |
//! | `tvl` | `tvl` | 0 |
//! | `volume_24h` | `last24hVolume`, `lastDailyVolume`, `volume24h` (first non-null) | 0 |
//! | `volume_7d` | `weeklyVolume` | 0 |
//! | `volume_30d` | `monthlyVolume` | 0 |
//! | `chains` | `chains` | empty |
//!
//! Unknown keys are ignored. A type mismatch fails the single record only.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::types::{BridgeId, BridgeRecord, RawRecord};

/// Name used when neither `displayName` nor `name` is usable.
pub const UNKNOWN_NAME: &str = "Unknown";

const NAME_KEYS: &[&str] = &["displayName", "name"];
const VOLUME_24H_KEYS: &[&str] = &["last24hVolume", "lastDailyVolume", "volume24h"];

/// Why a single raw record could not be normalised.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no id")]
    MissingId,

    #[error("id is neither an integer nor a string: {0}")]
    InvalidId(Value),

    #[error("field '{field}' is not numeric")]
    NotNumeric { field: &'static str },

    #[error("field 'chains' is not a list of strings")]
    InvalidChains,
}

/// Normalise one raw record, stamping it with `now`.
pub fn normalize(raw: &RawRecord, now: DateTime<Utc>) -> Result<BridgeRecord, NormalizeError> {
    if !raw.is_object() {
        return Err(NormalizeError::NotAnObject);
    }

    let id = parse_id(raw)?;
    let name = NAME_KEYS
        .iter()
        .filter_map(|key| raw.field(key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_string();

    let tvl = money(raw.field("tvl"), "tvl")?;
    let volume_24h = match raw.first_of(VOLUME_24H_KEYS) {
        Some((key, value)) => money(Some(value), key)?,
        None => 0.0,
    };
    let volume_7d = money(raw.field("weeklyVolume"), "weeklyVolume")?;
    let volume_30d = money(raw.field("monthlyVolume"), "monthlyVolume")?;
    let chains = parse_chains(raw)?;

    Ok(BridgeRecord {
        id,
        name,
        tvl,
        volume_24h,
        volume_7d,
        volume_30d,
        chains_count: chains.len(),
        chains,
        last_updated: now,
    })
}

/// Normalise a batch, preserving upstream order.
///
/// Records that fail normalisation, or whose id was already seen, are
/// skipped with one diagnostic line each.
pub fn normalize_batch(raws: &[RawRecord], now: DateTime<Utc>) -> Vec<BridgeRecord> {
    let mut seen = HashSet::with_capacity(raws.len());
    let mut out = Vec::with_capacity(raws.len());

    for (index, raw) in raws.iter().enumerate() {
        match normalize(raw, now) {
            Ok(record) => {
                if seen.insert(record.id.clone()) {
                    out.push(record);
                } else {
                    tracing::warn!(index, id = %record.id, "skipping bridge with duplicate id");
                }
            }
            Err(e) => {
                let label = raw
                    .first_of(&["name", "displayName", "id"])
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_else(|| "?".to_string());
                tracing::warn!(index, bridge = %label, error = %e, "skipping malformed bridge record");
            }
        }
    }

    out
}

fn parse_id(raw: &RawRecord) -> Result<BridgeId, NormalizeError> {
    match raw.field("id") {
        None => Err(NormalizeError::MissingId),
        Some(Value::String(s)) if s.is_empty() => Err(NormalizeError::MissingId),
        Some(Value::String(s)) => Ok(BridgeId::Str(s.clone())),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(BridgeId::Int)
            .ok_or_else(|| NormalizeError::InvalidId(Value::Number(n.clone()))),
        Some(other) => Err(NormalizeError::InvalidId(other.clone())),
    }
}

fn money(value: Option<&Value>, field: &'static str) -> Result<f64, NormalizeError> {
    match value {
        None => Ok(0.0),
        Some(Value::Number(n)) => Ok(sanitize(n.as_f64().unwrap_or(0.0))),
        Some(_) => Err(NormalizeError::NotNumeric { field }),
    }
}

/// Coerce a monetary value into the finite non-negative range.
pub(crate) fn sanitize(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

fn parse_chains(raw: &RawRecord) -> Result<Vec<String>, NormalizeError> {
    match raw.field("chains") {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(NormalizeError::InvalidChains)
            })
            .collect(),
        Some(_) => Err(NormalizeError::InvalidChains),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        RawRecord(value)
    }

    #[test]
    fn test_display_name_wins() {
        let now = Utc::now();
        let r = normalize(&raw(json!({"id": 1, "displayName": "Foo", "name": "Bar"})), now).unwrap();
        assert_eq!(r.name, "Foo");

        let r = normalize(&raw(json!({"id": 2, "name": "Baz"})), now).unwrap();
        assert_eq!(r.name, "Baz");

        let r = normalize(&raw(json!({"id": 3})), now).unwrap();
        assert_eq!(r.name, "Unknown");
    }

    #[test]
    fn test_empty_display_name_falls_through() {
        let r = normalize(&raw(json!({"id": 1, "displayName": "  ", "name": "Stargate"})), Utc::now())
            .unwrap();
        assert_eq!(r.name, "Stargate");
    }

    #[test]
    fn test_volume_fallback_order() {
        let now = Utc::now();
        let r = normalize(&raw(json!({"id": 1, "lastDailyVolume": 7e8})), now).unwrap();
        assert_eq!(r.volume_24h, 7e8);

        let r = normalize(
            &raw(json!({"id": 1, "last24hVolume": 1.0, "lastDailyVolume": 2.0, "volume24h": 3.0})),
            now,
        )
        .unwrap();
        assert_eq!(r.volume_24h, 1.0);

        let r = normalize(&raw(json!({"id": 1, "last24hVolume": null, "volume24h": 3.0})), now).unwrap();
        assert_eq!(r.volume_24h, 3.0);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let r = normalize(&raw(json!({"id": "hop"})), Utc::now()).unwrap();
        assert_eq!(r.id, BridgeId::Str("hop".into()));
        assert_eq!(r.tvl, 0.0);
        assert_eq!(r.volume_24h, 0.0);
        assert_eq!(r.volume_7d, 0.0);
        assert_eq!(r.volume_30d, 0.0);
        assert!(r.chains.is_empty());
        assert_eq!(r.chains_count, 0);
    }

    #[test]
    fn test_null_and_negative_money_become_zero() {
        let r = normalize(&raw(json!({"id": 1, "tvl": null, "weeklyVolume": -5.0})), Utc::now()).unwrap();
        assert_eq!(r.tvl, 0.0);
        assert_eq!(r.volume_7d, 0.0);
    }

    #[test]
    fn test_chains_count_matches_chains() {
        let r = normalize(
            &raw(json!({"id": 1, "chains": ["Ethereum", "Arbitrum", "Base"]})),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(r.chains_count, r.chains.len());
        assert_eq!(r.chains, vec!["Ethereum", "Arbitrum", "Base"]);
    }

    #[test]
    fn test_type_mismatches_fail() {
        let now = Utc::now();
        assert_eq!(
            normalize(&raw(json!({"id": 1, "tvl": "lots"})), now),
            Err(NormalizeError::NotNumeric { field: "tvl" })
        );
        assert_eq!(
            normalize(&raw(json!({"id": 1, "chains": "Ethereum"})), now),
            Err(NormalizeError::InvalidChains)
        );
        assert_eq!(
            normalize(&raw(json!({"id": 1, "chains": ["Ethereum", 4]})), now),
            Err(NormalizeError::InvalidChains)
        );
        assert_eq!(normalize(&raw(json!({"name": "x"})), now), Err(NormalizeError::MissingId));
        assert_eq!(normalize(&raw(json!([1, 2])), now), Err(NormalizeError::NotAnObject));
        assert!(matches!(
            normalize(&raw(json!({"id": true})), now),
            Err(NormalizeError::InvalidId(_))
        ));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let r = normalize(&raw(json!({"id": 9, "url": "https://x", "txs": [1, 2]})), Utc::now());
        assert!(r.is_ok());
    }

    #[test]
    fn test_normalize_idempotent_through_raw_encoding() {
        let now = Utc::now();
        let first = normalize(
            &raw(json!({
                "id": 5,
                "name": "Canonical",
                "displayName": "Shown",
                "tvl": 12.5,
                "volume24h": 3.0,
                "weeklyVolume": 21.0,
                "monthlyVolume": 90.0,
                "chains": ["X", "Y"],
            })),
            now,
        )
        .unwrap();
        let second = normalize(&first.to_raw(), now).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_batch_skips_bad_and_duplicate_records() {
        let raws = vec![
            raw(json!({"id": 1, "name": "A"})),
            raw(json!({"id": 2, "tvl": "oops"})),
            raw(json!({"id": 3, "name": "C"})),
            raw(json!({"id": 1, "name": "A again"})),
        ];
        let out = normalize_batch(&raws, Utc::now());
        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
        assert_eq!(sanitize(-1.0), 0.0);
        assert_eq!(sanitize(2.5), 2.5);
    }
}
