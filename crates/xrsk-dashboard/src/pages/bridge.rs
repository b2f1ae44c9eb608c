//! Single-bridge page: catalogue row plus upstream details and volume history.

use serde::Serialize;
use serde_json::Value;

use xrsk_bridges::{BridgeRecord, RawRecord};

use super::{bridge_table, BridgeRow, Page, DATA_UNAVAILABLE};

#[derive(Debug, Clone, Serialize)]
pub struct BridgeView {
    pub id: String,
    pub notice: Option<&'static str>,
    pub row: Option<BridgeRow>,
    pub chains: Vec<String>,
    pub details: Option<Value>,
    pub volume: Option<Value>,
}

pub fn build(
    table: &[BridgeRecord],
    id: &str,
    details: Option<&RawRecord>,
    volume: Option<&Value>,
) -> BridgeView {
    let record = table.iter().find(|r| r.id.to_string() == id);
    let nothing = record.is_none() && details.is_none() && volume.is_none();

    BridgeView {
        id: id.to_string(),
        notice: nothing.then_some(DATA_UNAVAILABLE),
        row: record.map(BridgeRow::from),
        chains: record.map(|r| r.chains.clone()).unwrap_or_default(),
        details: details.map(|d| d.0.clone()),
        volume: volume.cloned(),
    }
}

impl Page for BridgeView {
    fn render_text(&self) -> String {
        let mut out = format!("Bridge {}\n\n", self.id);
        if let Some(notice) = self.notice {
            out.push_str(&format!("!! {notice}\n\n"));
        }

        if let Some(row) = &self.row {
            out.push_str(&bridge_table(std::slice::from_ref(row)));
            if !self.chains.is_empty() {
                out.push_str(&format!("Chains: {}\n", self.chains.join(", ")));
            }
        }

        if let Some(details) = &self.details {
            let keys: Vec<&str> = details
                .as_object()
                .map(|o| o.keys().map(String::as_str).collect())
                .unwrap_or_default();
            out.push_str(&format!("\nUpstream details: {} fields ({})\n", keys.len(), keys.join(", ")));
        }

        match self.volume.as_ref().and_then(Value::as_array) {
            Some(points) => out.push_str(&format!("Volume history: {} points\n", points.len())),
            None if self.volume.is_some() => out.push_str("Volume history: available\n"),
            None => {}
        }
        out
    }
}
