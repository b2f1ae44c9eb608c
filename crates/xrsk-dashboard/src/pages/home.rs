//! Home page: headline metrics, top 10 by tvl, full bridge list.

use serde::Serialize;

use xrsk_bridges::derive::{self, Column};
use xrsk_bridges::{BridgeRecord, Summary};

use super::{bridge_table, notice_for, BridgeRow, Page};
use crate::format;

pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub notice: Option<&'static str>,
    pub summary: Summary,
    pub top_tvl: Vec<BridgeRow>,
    pub bridges: Vec<BridgeRow>,
}

pub fn build(table: &[BridgeRecord]) -> HomeView {
    HomeView {
        notice: notice_for(table),
        summary: Summary::of(table),
        top_tvl: derive::top_n(table, Column::Tvl, TOP_N)
            .into_iter()
            .map(BridgeRow::from)
            .collect(),
        bridges: table.iter().map(BridgeRow::from).collect(),
    }
}

impl Page for HomeView {
    fn render_text(&self) -> String {
        let s = &self.summary;
        let mut out = String::from("XRSK Platform: Cross-Chain Risk Intelligence\n\n");
        if let Some(notice) = self.notice {
            out.push_str(&format!("!! {notice}\n\n"));
        }

        out.push_str(&format!("Total TVL        {}\n", format::usd(s.total_tvl)));
        out.push_str(&format!("Volume 24h       {}\n", format::usd(s.total_volume_24h)));
        out.push_str(&format!("Bridges          {}\n", s.bridge_count));
        out.push_str(&format!("Chain links      {}\n", s.total_chain_links));
        out.push_str(&format!("Distinct chains  {}\n", s.distinct_chains));
        if let Some(leader) = &s.tvl_leader {
            out.push_str(&format!("TVL leader       {leader}\n"));
        }

        out.push_str(&format!("\nTop {TOP_N} bridges by TVL\n"));
        out.push_str(&bridge_table(&self.top_tvl));
        out.push_str("\nAll bridges\n");
        out.push_str(&bridge_table(&self.bridges));
        out
    }
}
