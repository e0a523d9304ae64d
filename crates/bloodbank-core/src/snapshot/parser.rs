use std::io::Read;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

/// One CSV row with its physical line number, fields still untyped.
#[derive(Debug)]
pub(crate) struct SnapshotRecord {
    pub(crate) line: u64,
    pub(crate) row: LotRow,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<SnapshotRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);
        let row: LotRow = record.deserialize(Some(&headers))?;
        records.push(SnapshotRecord { line, row });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LotRow {
    pub(crate) lot_id: String,
    pub(crate) blood_group: String,
    pub(crate) product: String,
    pub(crate) units: u32,
    pub(crate) collected_on: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) expires_on: Option<String>,
    #[serde(default)]
    pub(crate) unit_volume_ml: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) location: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) status: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts `YYYY-MM-DD`, `MM/DD/YYYY` and RFC 3339 timestamps (date part kept).
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%m/%d/%Y") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|timestamp| timestamp.date_naive())
}
