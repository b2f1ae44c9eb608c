//! Derived indicators over a materialised table of bridge records.
//!
//! Every function here is pure and idempotent. Rankings sort descending by
//! value and break ties by ascending id. Non-finite values read from a column
//! are treated as 0.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{BridgeError, BridgeRecord, BridgeResult};

/// A numeric column of [`BridgeRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Tvl,
    #[serde(rename = "volume_24h")]
    Volume24h,
    #[serde(rename = "volume_7d")]
    Volume7d,
    #[serde(rename = "volume_30d")]
    Volume30d,
    ChainsCount,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Tvl,
        Column::Volume24h,
        Column::Volume7d,
        Column::Volume30d,
        Column::ChainsCount,
    ];

    /// Read this column from a record.
    pub fn value(self, record: &BridgeRecord) -> f64 {
        let raw = match self {
            Column::Tvl => record.tvl,
            Column::Volume24h => record.volume_24h,
            Column::Volume7d => record.volume_7d,
            Column::Volume30d => record.volume_30d,
            Column::ChainsCount => record.chains_count as f64,
        };
        finite_or_zero(raw)
    }

    /// Field name as it appears on the record.
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Tvl => "tvl",
            Column::Volume24h => "volume_24h",
            Column::Volume7d => "volume_7d",
            Column::Volume30d => "volume_30d",
            Column::ChainsCount => "chains_count",
        }
    }
}

impl FromStr for Column {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| BridgeError::UnknownColumn(s.to_string()))
    }
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// A record paired with one derived indicator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotated<'a> {
    pub record: &'a BridgeRecord,
    pub value: f64,
}

impl<'a> Annotated<'a> {
    /// The `n` highest-valued rows, ties broken by ascending id.
    pub fn top(mut rows: Vec<Annotated<'a>>, n: usize) -> Vec<Annotated<'a>> {
        rows.sort_by(|a, b| {
            descending(a.value, b.value).then_with(|| a.record.id.cmp(&b.record.id))
        });
        rows.truncate(n);
        rows
    }
}

/// First `n` rows sorted by `col` descending; ties broken by ascending id.
pub fn top_n(table: &[BridgeRecord], col: Column, n: usize) -> Vec<&BridgeRecord> {
    let mut rows: Vec<&BridgeRecord> = table.iter().collect();
    rows.sort_by(|a, b| descending(col.value(a), col.value(b)).then_with(|| a.id.cmp(&b.id)));
    rows.truncate(n);
    rows
}

/// Σ col. Empty → 0.
pub fn sum(table: &[BridgeRecord], col: Column) -> f64 {
    table.iter().map(|r| col.value(r)).sum()
}

/// Σ col / |T|. Empty → 0.
pub fn mean(table: &[BridgeRecord], col: Column) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    sum(table, col) / table.len() as f64
}

/// Lower median of col. Empty gives 0.
pub fn median(table: &[BridgeRecord], col: Column) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    let mut values: Vec<f64> = table.iter().map(|r| col.value(r)).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    values[(values.len() - 1) / 2]
}

/// Row with the largest col; the smallest id wins ties.
pub fn argmax(table: &[BridgeRecord], col: Column) -> BridgeResult<&BridgeRecord> {
    top_n(table, col, 1)
        .into_iter()
        .next()
        .ok_or(BridgeError::EmptyTable)
}

/// Per-row share of the column total, in percent. All zero when the total is 0.
pub fn share(table: &[BridgeRecord], col: Column) -> Vec<Annotated<'_>> {
    let total = sum(table, col);
    table
        .iter()
        .map(|record| Annotated {
            record,
            value: if total > 0.0 {
                col.value(record) / total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// `tvl / Σ tvl * 100` per row.
pub fn dominance(table: &[BridgeRecord]) -> Vec<Annotated<'_>> {
    share(table, Column::Tvl)
}

/// `volume_24h / Σ volume_24h * 100` per row.
pub fn dominance_volume(table: &[BridgeRecord]) -> Vec<Annotated<'_>> {
    share(table, Column::Volume24h)
}

/// `volume_24h / tvl * 100` per row; 0 where tvl is 0.
pub fn activity(table: &[BridgeRecord]) -> Vec<Annotated<'_>> {
    table
        .iter()
        .map(|record| {
            let tvl = Column::Tvl.value(record);
            Annotated {
                record,
                value: if tvl > 0.0 {
                    Column::Volume24h.value(record) / tvl * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect()
}

/// Rows with `volume_24h > threshold`, in table order.
pub fn active(table: &[BridgeRecord], threshold: f64) -> Vec<&BridgeRecord> {
    table
        .iter()
        .filter(|r| Column::Volume24h.value(r) > threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BridgeId;
    use chrono::Utc;

    fn record(id: i64, name: &str, tvl: f64, volume_24h: f64) -> BridgeRecord {
        BridgeRecord {
            id: BridgeId::Int(id),
            name: name.to_string(),
            tvl,
            volume_24h,
            volume_7d: 0.0,
            volume_30d: 0.0,
            chains: Vec::new(),
            chains_count: 0,
            last_updated: Utc::now(),
        }
    }

    fn sample() -> Vec<BridgeRecord> {
        vec![
            record(1, "A", 10e9, 2e9),
            record(2, "B", 5e9, 1e9),
            record(3, "C", 5e9, 0.0),
        ]
    }

    #[test]
    fn test_top_n_sorted_with_id_tiebreak() {
        let table = vec![
            record(4, "D", 5.0, 0.0),
            record(2, "B", 5.0, 0.0),
            record(9, "Z", 7.0, 0.0),
        ];
        let top = top_n(&table, Column::Tvl, 3);
        let ids: Vec<_> = top.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![BridgeId::Int(9), BridgeId::Int(2), BridgeId::Int(4)]);
    }

    #[test]
    fn test_top_n_length() {
        let table = sample();
        assert_eq!(top_n(&table, Column::Tvl, 2).len(), 2);
        assert_eq!(top_n(&table, Column::Tvl, 10).len(), 3);
        assert!(top_n(&[], Column::Tvl, 5).is_empty());
    }

    #[test]
    fn test_aggregates() {
        let table = sample();
        assert_eq!(sum(&table, Column::Tvl), 20e9);
        assert!((mean(&table, Column::Tvl) - 20e9 / 3.0).abs() < 1.0);
        assert_eq!(median(&table, Column::Tvl), 5e9);
        assert_eq!(argmax(&table, Column::Tvl).unwrap().name, "A");
    }

    #[test]
    fn test_lower_median_on_even_size() {
        let table = vec![
            record(1, "A", 1.0, 0.0),
            record(2, "B", 4.0, 0.0),
            record(3, "C", 3.0, 0.0),
            record(4, "D", 2.0, 0.0),
        ];
        assert_eq!(median(&table, Column::Tvl), 2.0);
    }

    #[test]
    fn test_empty_aggregates_are_zero() {
        assert_eq!(sum(&[], Column::Volume24h), 0.0);
        assert_eq!(mean(&[], Column::Volume24h), 0.0);
        assert_eq!(median(&[], Column::Volume24h), 0.0);
        assert!(matches!(argmax(&[], Column::Tvl), Err(BridgeError::EmptyTable)));
    }

    #[test]
    fn test_argmax_tie_prefers_smallest_id() {
        let table = vec![record(7, "Late", 3.0, 0.0), record(5, "Early", 3.0, 0.0)];
        assert_eq!(argmax(&table, Column::Tvl).unwrap().name, "Early");
    }

    #[test]
    fn test_dominance_shares() {
        let table = sample();
        let values: Vec<f64> = dominance(&table).iter().map(|a| a.value).collect();
        assert_eq!(values, vec![50.0, 25.0, 25.0]);
        let total: f64 = values.iter().sum();
        assert!((99.9..=100.1).contains(&total));
    }

    #[test]
    fn test_dominance_zero_total() {
        let table = vec![record(1, "A", 0.0, 0.0), record(2, "B", 0.0, 0.0)];
        assert!(dominance(&table).iter().all(|a| a.value == 0.0));
    }

    #[test]
    fn test_dominance_volume() {
        let table = sample();
        let values: Vec<f64> = dominance_volume(&table).iter().map(|a| a.value).collect();
        assert!((values[0] - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(values[2], 0.0);
    }

    #[test]
    fn test_activity_ratio() {
        let table = vec![record(1, "A", 10.0, 5.0), record(2, "B", 0.0, 9.0)];
        let ratios: Vec<f64> = activity(&table).iter().map(|a| a.value).collect();
        assert_eq!(ratios, vec![50.0, 0.0]);
    }

    #[test]
    fn test_active_excludes_idle_bridges() {
        let table = sample();
        let names: Vec<_> = active(&table, 0.0).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_non_finite_values_read_as_zero() {
        let mut bad = record(1, "A", f64::NAN, f64::INFINITY);
        bad.volume_7d = f64::NEG_INFINITY;
        assert_eq!(Column::Tvl.value(&bad), 0.0);
        assert_eq!(Column::Volume24h.value(&bad), 0.0);
        assert_eq!(Column::Volume7d.value(&bad), 0.0);
    }

    #[test]
    fn test_annotated_top() {
        let table = sample();
        let top = Annotated::top(activity(&table), 2);
        assert_eq!(top[0].record.name, "A");
        assert_eq!(top[1].record.name, "B");
    }

    #[test]
    fn test_column_from_str() {
        assert_eq!("volume_24h".parse::<Column>().unwrap(), Column::Volume24h);
        assert_eq!("chains_count".parse::<Column>().unwrap(), Column::ChainsCount);
        assert!("price".parse::<Column>().is_err());
    }
}
