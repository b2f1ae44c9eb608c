//! Dashboard-level aggregates: headline metrics, filters, distributions.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::derive::{self, Column};
use crate::types::BridgeRecord;

/// Headline metrics over a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub bridge_count: usize,
    pub total_tvl: f64,
    pub total_volume_24h: f64,
    /// Σ chains_count, i.e. bridge-to-chain connections.
    pub total_chain_links: usize,
    /// Number of distinct chain names across all bridges.
    pub distinct_chains: usize,
    pub mean_tvl: f64,
    pub median_tvl: f64,
    /// Name of the bridge with the largest tvl.
    pub tvl_leader: Option<String>,
}

impl Summary {
    pub fn of(table: &[BridgeRecord]) -> Self {
        let distinct: BTreeSet<&str> = table
            .iter()
            .flat_map(|r| r.chains.iter().map(String::as_str))
            .collect();

        Self {
            bridge_count: table.len(),
            total_tvl: derive::sum(table, Column::Tvl),
            total_volume_24h: derive::sum(table, Column::Volume24h),
            total_chain_links: table.iter().map(|r| r.chains_count).sum(),
            distinct_chains: distinct.len(),
            mean_tvl: derive::mean(table, Column::Tvl),
            median_tvl: derive::median(table, Column::Tvl),
            tvl_leader: derive::argmax(table, Column::Tvl).ok().map(|r| r.name.clone()),
        }
    }
}

/// Minimum thresholds applied by the analytics view. Defaults keep every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeFilter {
    pub min_tvl: f64,
    pub min_volume_24h: f64,
    pub min_chains: usize,
}

impl BridgeFilter {
    pub fn matches(&self, record: &BridgeRecord) -> bool {
        Column::Tvl.value(record) >= self.min_tvl
            && Column::Volume24h.value(record) >= self.min_volume_24h
            && record.chains_count >= self.min_chains
    }

    /// Matching rows, in table order.
    pub fn apply<'a>(&self, table: &'a [BridgeRecord]) -> Vec<&'a BridgeRecord> {
        table.iter().filter(|r| self.matches(r)).collect()
    }

    /// Owned copy of the matching rows, for feeding back into derivations.
    pub fn apply_owned(&self, table: &[BridgeRecord]) -> Vec<BridgeRecord> {
        self.apply(table).into_iter().cloned().collect()
    }
}

/// chains_count → number of bridges serving that many chains.
pub fn chain_distribution(table: &[BridgeRecord]) -> BTreeMap<usize, usize> {
    let mut out = BTreeMap::new();
    for record in table {
        *out.entry(record.chains_count).or_insert(0) += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BridgeId;
    use chrono::Utc;

    fn record(id: i64, tvl: f64, volume_24h: f64, chains: &[&str]) -> BridgeRecord {
        BridgeRecord {
            id: BridgeId::Int(id),
            name: format!("bridge-{id}"),
            tvl,
            volume_24h,
            volume_7d: 0.0,
            volume_30d: 0.0,
            chains: chains.iter().map(|c| c.to_string()).collect(),
            chains_count: chains.len(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_summary() {
        let table = vec![
            record(1, 10e9, 2e9, &["X", "Y"]),
            record(2, 5e9, 1e9, &["X"]),
            record(3, 5e9, 0.0, &[]),
        ];
        let s = Summary::of(&table);
        assert_eq!(s.bridge_count, 3);
        assert_eq!(s.total_tvl, 20e9);
        assert_eq!(s.total_volume_24h, 3e9);
        assert_eq!(s.total_chain_links, 3);
        assert_eq!(s.distinct_chains, 2);
        assert_eq!(s.median_tvl, 5e9);
        assert_eq!(s.tvl_leader.as_deref(), Some("bridge-1"));
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let s = Summary::of(&[]);
        assert_eq!(s.bridge_count, 0);
        assert_eq!(s.total_tvl, 0.0);
        assert_eq!(s.mean_tvl, 0.0);
        assert!(s.tvl_leader.is_none());
    }

    #[test]
    fn test_filter() {
        let table = vec![
            record(1, 10e6, 1e6, &["X", "Y"]),
            record(2, 2e6, 5e6, &["X"]),
            record(3, 50e6, 0.0, &["X", "Y", "Z"]),
        ];
        let filter = BridgeFilter {
            min_tvl: 5e6,
            min_volume_24h: 0.0,
            min_chains: 2,
        };
        let ids: Vec<_> = filter.apply(&table).iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![BridgeId::Int(1), BridgeId::Int(3)]);

        assert_eq!(BridgeFilter::default().apply(&table).len(), 3);
    }

    #[test]
    fn test_chain_distribution() {
        let table = vec![
            record(1, 0.0, 0.0, &["X", "Y"]),
            record(2, 0.0, 0.0, &["X"]),
            record(3, 0.0, 0.0, &["Y", "Z"]),
        ];
        let dist = chain_distribution(&table);
        assert_eq!(dist.get(&1), Some(&1));
        assert_eq!(dist.get(&2), Some(&2));
        assert_eq!(dist.len(), 2);
    }
}
