//! Trends page: market share by tvl and by volume, and activity ranking.

use serde::Serialize;

use xrsk_bridges::derive;
use xrsk_bridges::{Annotated, BridgeRecord};

use super::{indicator_table, notice_for, IndicatorRow, Page};

pub const TOP_N: usize = 15;

#[derive(Debug, Clone, Serialize)]
pub struct TrendsView {
    pub notice: Option<&'static str>,
    pub tvl_dominance: Vec<IndicatorRow>,
    pub volume_dominance: Vec<IndicatorRow>,
    pub activity: Vec<IndicatorRow>,
}

fn ranked(rows: Vec<Annotated<'_>>, n: usize) -> Vec<IndicatorRow> {
    Annotated::top(rows, n).iter().map(IndicatorRow::from).collect()
}

pub fn build(table: &[BridgeRecord], n: usize) -> TrendsView {
    TrendsView {
        notice: notice_for(table),
        tvl_dominance: ranked(derive::dominance(table), n),
        volume_dominance: ranked(derive::dominance_volume(table), n),
        activity: ranked(derive::activity(table), n),
    }
}

impl Page for TrendsView {
    fn render_text(&self) -> String {
        let mut out = String::from("Bridge Trends\n\n");
        if let Some(notice) = self.notice {
            out.push_str(&format!("!! {notice}\n\n"));
        }
        out.push_str("Market share (TVL)\n");
        out.push_str(&indicator_table("Dominance", &self.tvl_dominance));
        out.push_str("\nMarket share (24h volume)\n");
        out.push_str(&indicator_table("Dominance", &self.volume_dominance));
        out.push_str("\nActivity (24h volume / TVL)\n");
        out.push_str(&indicator_table("Ratio", &self.activity));
        out
    }
}
