//! Ledger ingestion from exported account-balance sheets
//!
//! Ingestion is all-or-nothing: a file either yields its complete record
//! list or an [`IngestError`], never a partial ledger.

pub mod sheet;

pub use sheet::*;

use std::io::Read;

use crate::config::ReconciliationConfig;
use crate::types::LedgerRecord;

/// Ledger ingestion errors
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Sheet contains no rows")]
    EmptySheet,
    #[error("Balance column (Tot.rpt.pr) not found in sheet")]
    MissingBalanceColumn,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a ledger export in CSV form.
///
/// The file is read as a raw grid (no header assumption, ragged rows
/// allowed) and then handed to [`ingest_rows`].
pub fn read_ledger_csv<R: Read>(
    reader: R,
    config: &ReconciliationConfig,
) -> Result<Vec<LedgerRecord>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    ingest_rows(&rows, config.header_scan_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn test_read_ledger_csv() {
        let data = "\
SAP export,,
BusA,Text,Tot.rpt.pr
1001,KBANK C/A 123-4-56789-0,\"12,500.00\"
,Subtotal,
1002,SCB S/A 987-6-54321-0,-300.25
";
        let records = read_ledger_csv(data.as_bytes(), &ReconciliationConfig::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "ledger-2");
        assert_eq!(records[0].balance, BigDecimal::from_str("12500.00").unwrap());
        assert_eq!(records[1].branch_code, "1002");
        assert_eq!(records[1].balance, BigDecimal::from_str("-300.25").unwrap());
    }

    #[test]
    fn test_read_ledger_csv_without_balance_column() {
        let data = "BusA,Text\n1001,KBANK\n";
        let err = read_ledger_csv(data.as_bytes(), &ReconciliationConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::MissingBalanceColumn));
    }

    #[test]
    fn test_read_ledger_csv_empty_input() {
        let err = read_ledger_csv("".as_bytes(), &ReconciliationConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::EmptySheet));
    }
}
