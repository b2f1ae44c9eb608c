//! Dashboard pages: serialisable view models built from the cached table.

pub mod analytics;
pub mod bridge;
pub mod home;
pub mod ranking;
pub mod trends;

use serde::Serialize;

use xrsk_bridges::{Annotated, BridgeId, BridgeRecord};

use crate::error::DashboardResult;
use crate::format;

/// Banner shown when the upstream returned nothing.
pub const DATA_UNAVAILABLE: &str = "data unavailable";

/// A page that renders either as text or as JSON.
pub trait Page: Serialize {
    fn render_text(&self) -> String;
}

/// Render `page` as pretty JSON or as its text form.
pub fn render<P: Page>(page: &P, json: bool) -> DashboardResult<String> {
    if json {
        Ok(serde_json::to_string_pretty(page)?)
    } else {
        Ok(page.render_text())
    }
}

/// `Some(DATA_UNAVAILABLE)` for an empty table.
pub(crate) fn notice_for(table: &[BridgeRecord]) -> Option<&'static str> {
    table.is_empty().then_some(DATA_UNAVAILABLE)
}

/// One bridge as listed in a table view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeRow {
    pub id: BridgeId,
    pub name: String,
    pub tvl: f64,
    pub volume_24h: f64,
    pub chains_count: usize,
}

impl From<&BridgeRecord> for BridgeRow {
    fn from(r: &BridgeRecord) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            tvl: r.tvl,
            volume_24h: r.volume_24h,
            chains_count: r.chains_count,
        }
    }
}

pub(crate) fn bridge_table(rows: &[BridgeRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                format::usd(r.tvl),
                format::usd(r.volume_24h),
                r.chains_count.to_string(),
            ]
        })
        .collect();
    format::table(&["Bridge", "TVL", "Volume 24h", "Chains"], &cells)
}

/// One bridge with a derived percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub id: BridgeId,
    pub name: String,
    pub tvl: f64,
    pub volume_24h: f64,
    pub value: f64,
}

impl From<&Annotated<'_>> for IndicatorRow {
    fn from(a: &Annotated<'_>) -> Self {
        Self {
            id: a.record.id.clone(),
            name: a.record.name.clone(),
            tvl: a.record.tvl,
            volume_24h: a.record.volume_24h,
            value: a.value,
        }
    }
}

pub(crate) fn indicator_table(label: &str, rows: &[IndicatorRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                format::usd(r.tvl),
                format::usd(r.volume_24h),
                format::percent(r.value),
            ]
        })
        .collect();
    format::table(&["Bridge", "TVL", "Volume 24h", label], &cells)
}
