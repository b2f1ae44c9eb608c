//! Analytics page: filtered metrics, top 15, chain-count distribution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use xrsk_bridges::derive::{self, Column};
use xrsk_bridges::{chain_distribution, BridgeFilter, BridgeRecord, Summary};

use super::{bridge_table, notice_for, BridgeRow, Page};
use crate::format;

pub const TOP_N: usize = 15;

/// Filter thresholds as entered by a viewer: money in millions of USD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsQuery {
    pub min_tvl_m: f64,
    pub min_volume_m: f64,
    pub min_chains: usize,
}

impl AnalyticsQuery {
    pub fn to_filter(self) -> BridgeFilter {
        BridgeFilter {
            min_tvl: self.min_tvl_m * 1e6,
            min_volume_24h: self.min_volume_m * 1e6,
            min_chains: self.min_chains,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsView {
    pub notice: Option<&'static str>,
    pub filter: BridgeFilter,
    pub matched: usize,
    pub summary: Summary,
    pub top_tvl: Vec<BridgeRow>,
    /// chains_count → number of bridges.
    pub chain_distribution: BTreeMap<usize, usize>,
}

pub fn build(table: &[BridgeRecord], query: AnalyticsQuery) -> AnalyticsView {
    let filter = query.to_filter();
    let filtered = filter.apply_owned(table);

    AnalyticsView {
        notice: notice_for(table),
        filter,
        matched: filtered.len(),
        summary: Summary::of(&filtered),
        top_tvl: derive::top_n(&filtered, Column::Tvl, TOP_N)
            .into_iter()
            .map(BridgeRow::from)
            .collect(),
        chain_distribution: chain_distribution(&filtered),
    }
}

impl Page for AnalyticsView {
    fn render_text(&self) -> String {
        let mut out = String::from("Bridge Analytics\n\n");
        if let Some(notice) = self.notice {
            out.push_str(&format!("!! {notice}\n\n"));
        }

        out.push_str(&format!("{} bridges match the filters\n", self.matched));
        out.push_str(&format!("Filtered TVL        {}\n", format::usd(self.summary.total_tvl)));
        out.push_str(&format!(
            "Filtered volume 24h {}\n",
            format::usd(self.summary.total_volume_24h)
        ));

        out.push_str(&format!("\nTop {TOP_N} by TVL\n"));
        out.push_str(&bridge_table(&self.top_tvl));

        out.push_str("\nChains per bridge\n");
        let rows: Vec<Vec<String>> = self
            .chain_distribution
            .iter()
            .map(|(chains, bridges)| vec![chains.to_string(), bridges.to_string()])
            .collect();
        out.push_str(&format::table(&["Chains", "Bridges"], &rows));
        out
    }
}
