//! CSV export and import of normalised tables.
//!
//! Header row uses the [`BridgeRecord`] field names in declaration order.
//! `id` is written as a JSON scalar (`42` or `"42"`) so its kind survives a
//! round trip, `chains` is written as a JSON array inside one quoted field, floats use
//! the shortest representation that parses back to the same value, and
//! `last_updated` is RFC 3339.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::{BridgeError, BridgeId, BridgeRecord, BridgeResult};

pub const HEADER: [&str; 9] = [
    "id",
    "name",
    "tvl",
    "volume_24h",
    "volume_7d",
    "volume_30d",
    "chains",
    "chains_count",
    "last_updated",
];

/// Write `table` as UTF-8 CSV.
pub fn write_csv<W: Write>(table: &[BridgeRecord], mut out: W) -> BridgeResult<()> {
    writeln!(out, "{}", HEADER.join(","))?;
    for record in table {
        let fields = [
            escape(&serde_json::to_string(&record.id)?),
            escape(&record.name),
            record.tvl.to_string(),
            record.volume_24h.to_string(),
            record.volume_7d.to_string(),
            record.volume_30d.to_string(),
            escape(&serde_json::to_string(&record.chains)?),
            record.chains_count.to_string(),
            record
                .last_updated
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ];
        writeln!(out, "{}", fields.join(","))?;
    }
    out.flush()?;
    Ok(())
}

/// Render `table` as a CSV string.
pub fn to_csv_string(table: &[BridgeRecord]) -> BridgeResult<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| BridgeError::Csv {
        line: 0,
        reason: e.to_string(),
    })
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Parse CSV produced by [`write_csv`] back into records.
pub fn read_csv(input: &str) -> BridgeResult<Vec<BridgeRecord>> {
    let rows = split_rows(input)?;
    let mut rows = rows.into_iter();

    match rows.next() {
        Some((_, header)) if header == HEADER => {}
        Some((line, header)) => {
            return Err(BridgeError::Csv {
                line,
                reason: format!("unexpected header: {}", header.join(",")),
            })
        }
        None => return Ok(Vec::new()),
    }

    rows.map(|(line, fields)| parse_record(line, &fields)).collect()
}

fn parse_record(line: usize, fields: &[String]) -> BridgeResult<BridgeRecord> {
    if fields.len() != HEADER.len() {
        return Err(BridgeError::Csv {
            line,
            reason: format!("expected {} fields, found {}", HEADER.len(), fields.len()),
        });
    }

    let bad = |column: &str, detail: String| BridgeError::Csv {
        line,
        reason: format!("column '{column}': {detail}"),
    };
    let number = |i: usize| -> BridgeResult<f64> {
        fields[i]
            .parse::<f64>()
            .map_err(|e| bad(HEADER[i], e.to_string()))
    };

    let id: BridgeId = serde_json::from_str(&fields[0]).map_err(|e| bad("id", e.to_string()))?;
    let chains: Vec<String> =
        serde_json::from_str(&fields[6]).map_err(|e| bad("chains", e.to_string()))?;
    let chains_count = fields[7]
        .parse::<usize>()
        .map_err(|e| bad("chains_count", e.to_string()))?;
    let last_updated = DateTime::parse_from_rfc3339(&fields[8])
        .map_err(|e| bad("last_updated", e.to_string()))?
        .with_timezone(&Utc);

    Ok(BridgeRecord {
        id,
        name: fields[1].clone(),
        tvl: number(2)?,
        volume_24h: number(3)?,
        volume_7d: number(4)?,
        volume_30d: number(5)?,
        chains,
        chains_count,
        last_updated,
    })
}

/// Split CSV text into rows of unescaped fields, tagged with the 1-based
/// line each row starts on. Quoted fields may span lines.
fn split_rows(input: &str) -> BridgeResult<Vec<(usize, Vec<String>)>> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            ('\r', false) if chars.peek() == Some(&'\n') => {}
            ('\n', false) => {
                fields.push(std::mem::take(&mut field));
                rows.push((row_start, std::mem::take(&mut fields)));
                line += 1;
                row_start = line;
            }
            ('\n', true) => {
                field.push(c);
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(BridgeError::Csv {
            line: row_start,
            reason: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        rows.push((row_start, fields));
    }

    Ok(rows)
}
