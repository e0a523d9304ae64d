//! CSV import of exported inventory lot lists.
//!
//! Expected header: `lot_id,blood_group,product,units,collected_on` followed by the optional
//! `expires_on,unit_volume_ml,location,status` columns. Rows pass through the same intake
//! validation as a bench receipt, except that drained lots with zero units are kept.

mod parser;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::matching::{InventoryLot, IntakeError, IntakeGuard, LotId, LotReceipt, LotStatus};

#[derive(Debug)]
pub enum SnapshotImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidDate {
        line: u64,
        field: &'static str,
        value: String,
    },
    InvalidStatus {
        line: u64,
        value: String,
    },
    DuplicateLot {
        line: u64,
        lot_id: LotId,
    },
    Row {
        line: u64,
        source: IntakeError,
    },
}

impl std::fmt::Display for SnapshotImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotImportError::Io(err) => write!(f, "failed to read lot snapshot: {err}"),
            SnapshotImportError::Csv(err) => write!(f, "invalid lot snapshot CSV: {err}"),
            SnapshotImportError::InvalidDate { line, field, value } => {
                write!(f, "line {line}: {field} '{value}' is not a recognised date")
            }
            SnapshotImportError::InvalidStatus { line, value } => {
                write!(f, "line {line}: unknown lot status '{value}'")
            }
            SnapshotImportError::DuplicateLot { line, lot_id } => {
                write!(f, "line {line}: lot {lot_id} appears more than once")
            }
            SnapshotImportError::Row { line, source } => write!(f, "line {line}: {source}"),
        }
    }
}

impl std::error::Error for SnapshotImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotImportError::Io(err) => Some(err),
            SnapshotImportError::Csv(err) => Some(err),
            SnapshotImportError::Row { source, .. } => Some(source),
            SnapshotImportError::InvalidDate { .. }
            | SnapshotImportError::InvalidStatus { .. }
            | SnapshotImportError::DuplicateLot { .. } => None,
        }
    }
}

impl From<std::io::Error> for SnapshotImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SnapshotImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct LotSnapshotImporter;

impl LotSnapshotImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<InventoryLot>, SnapshotImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<InventoryLot>, SnapshotImportError> {
        Self::with_guard(reader, &IntakeGuard::default())
    }

    pub fn with_guard<R: Read>(
        reader: R,
        guard: &IntakeGuard,
    ) -> Result<Vec<InventoryLot>, SnapshotImportError> {
        let mut seen: HashSet<LotId> = HashSet::new();
        let mut lots = Vec::new();

        for record in parser::parse_records(reader)? {
            let line = record.line;
            let row = record.row;

            let collected_on = required_date(line, "collected_on", &row.collected_on)?;
            let expires_on = row
                .expires_on
                .as_deref()
                .map(|value| required_date(line, "expires_on", value))
                .transpose()?;
            let status = row
                .status
                .as_deref()
                .map(|value| parse_status(line, value))
                .transpose()?
                .unwrap_or(LotStatus::Available);

            let receipt = LotReceipt {
                lot_id: row.lot_id,
                blood_group: row.blood_group,
                product: row.product,
                units: row.units,
                collected_on,
                expires_on,
                unit_volume_ml: row.unit_volume_ml,
                location: row.location.unwrap_or_default(),
            };

            let mut lot = guard
                .lot_from_snapshot(receipt)
                .map_err(|source| SnapshotImportError::Row { line, source })?;
            lot.status = status;

            if !seen.insert(lot.id.clone()) {
                return Err(SnapshotImportError::DuplicateLot {
                    line,
                    lot_id: lot.id,
                });
            }
            lots.push(lot);
        }

        Ok(lots)
    }
}

fn required_date(
    line: u64,
    field: &'static str,
    value: &str,
) -> Result<chrono::NaiveDate, SnapshotImportError> {
    parser::parse_date(value).ok_or_else(|| SnapshotImportError::InvalidDate {
        line,
        field,
        value: value.to_string(),
    })
}

fn parse_status(line: u64, value: &str) -> Result<LotStatus, SnapshotImportError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "available" => Ok(LotStatus::Available),
        "reserved" => Ok(LotStatus::Reserved),
        "expired" => Ok(LotStatus::Expired),
        "discarded" => Ok(LotStatus::Discarded),
        _ => Err(SnapshotImportError::InvalidStatus {
            line,
            value: value.to_string(),
        }),
    }
}
