//! Ranking page: top-N bridges by any numeric column.

use serde::Serialize;

use xrsk_bridges::derive::{self, Column};
use xrsk_bridges::BridgeRecord;

use super::{bridge_table, notice_for, BridgeRow, Page};

#[derive(Debug, Clone, Serialize)]
pub struct RankingView {
    pub notice: Option<&'static str>,
    pub column: Column,
    pub rows: Vec<BridgeRow>,
}

pub fn build(table: &[BridgeRecord], column: Column, n: usize) -> RankingView {
    RankingView {
        notice: notice_for(table),
        column,
        rows: derive::top_n(table, column, n)
            .into_iter()
            .map(BridgeRow::from)
            .collect(),
    }
}

impl Page for RankingView {
    fn render_text(&self) -> String {
        let mut out = format!("Top {} bridges by {}\n\n", self.rows.len(), self.column.as_str());
        if let Some(notice) = self.notice {
            out.push_str(&format!("!! {notice}\n\n"));
        }
        out.push_str(&bridge_table(&self.rows));
        out
    }
}
