//! Ledger extraction from a grid of spreadsheet cells

use bigdecimal::BigDecimal;
use std::str::FromStr;
use tracing::{debug, info};

use super::IngestError;
use crate::types::{LedgerRecord, NOT_AVAILABLE};

/// Markers that identify the header row
const HEADER_MARKERS: &[&str] = &["BusA", "Tot.rpt.pr"];
const BRANCH_HEADERS: &[&str] = &["BusA"];
const NARRATIVE_HEADERS: &[&str] = &["ข้อความ", "Text"];
const BALANCE_HEADERS: &[&str] = &["Tot.rpt.pr", "Balance"];

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Index of the header row in the grid
    pub header_row: usize,
    pub branch: Option<usize>,
    pub narrative: Option<usize>,
    pub balance: usize,
}

impl ColumnLayout {
    /// Locate the header row within the first `scan_rows` rows and resolve
    /// the columns. Falls back to the first row when no marker is found.
    pub fn detect(rows: &[Vec<String>], scan_rows: usize) -> Result<Self, IngestError> {
        if rows.is_empty() {
            return Err(IngestError::EmptySheet);
        }

        let header_row = rows
            .iter()
            .take(scan_rows)
            .position(|row| row.iter().any(|cell| contains_any(cell, HEADER_MARKERS)))
            .unwrap_or(0);
        let headers = &rows[header_row];

        let balance =
            find_column(headers, BALANCE_HEADERS).ok_or(IngestError::MissingBalanceColumn)?;

        Ok(Self {
            header_row,
            branch: find_column(headers, BRANCH_HEADERS),
            narrative: find_column(headers, NARRATIVE_HEADERS),
            balance,
        })
    }
}

/// Turn spreadsheet rows into ledger records.
///
/// Blank rows and rows whose balance is not a number (subtotals, notes)
/// are skipped. Record ids carry the row index: `ledger-{row}`.
pub fn ingest_rows(
    rows: &[Vec<String>],
    scan_rows: usize,
) -> Result<Vec<LedgerRecord>, IngestError> {
    let layout = ColumnLayout::detect(rows, scan_rows)?;
    debug!(?layout, "resolved ledger columns");

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (index, row) in rows.iter().enumerate().skip(layout.header_row + 1) {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let Some(balance) = row.get(layout.balance).and_then(|cell| parse_amount(cell)) else {
            skipped += 1;
            continue;
        };

        let narrative = cell_at(row, layout.narrative).unwrap_or_default().to_string();
        let branch_code = cell_at(row, layout.branch)
            .filter(|cell| !cell.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string();

        records.push(LedgerRecord::new(
            format!("ledger-{index}"),
            branch_code,
            narrative,
            balance,
        ));
    }

    info!(records = records.len(), skipped, "ingested ledger rows");
    Ok(records)
}

/// Parse a balance cell, tolerating thousands separators
pub fn parse_amount(cell: &str) -> Option<BigDecimal> {
    let cleaned = cell.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    BigDecimal::from_str(cleaned).ok()
}

fn cell_at(row: &[String], column: Option<usize>) -> Option<&str> {
    column.and_then(|c| row.get(c)).map(|cell| cell.trim())
}

fn contains_any(cell: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| cell.contains(needle))
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| contains_any(h, names))
}
