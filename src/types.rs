//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::extract::ExtractionError;
use crate::ingest::IngestError;

/// Label used when a record carries no branch / business area
pub const NOT_AVAILABLE: &str = "N/A";

/// Label used when no bank could be identified
pub const UNKNOWN_BANK: &str = "Unknown";

/// Account classes recognised in ledger narratives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccountClass {
    /// Current account (C/A)
    CurrentAccount,
    /// Savings account (S/A)
    SavingsAccount,
    /// Fixed deposit (F/D)
    FixedDeposit,
    /// No class keyword found, or no ledger side at all
    #[default]
    Unknown,
}

impl AccountClass {
    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            AccountClass::CurrentAccount => "C/A",
            AccountClass::SavingsAccount => "S/A",
            AccountClass::FixedDeposit => "F/D",
            AccountClass::Unknown => "-",
        }
    }
}

impl fmt::Display for AccountClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One account-balance line from the internal accounting export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Identifier, unique within a reconciliation run
    pub id: String,
    /// Branch / business area label ("N/A" when missing)
    pub branch_code: String,
    /// Free-text description; source of bank and account hints
    pub narrative: String,
    /// Signed balance in ledger currency
    pub balance: BigDecimal,
    /// Account class detected from the narrative
    pub account_class: AccountClass,
}

impl LedgerRecord {
    /// Create a ledger record, deriving the account class from the narrative
    pub fn new(id: String, branch_code: String, narrative: String, balance: BigDecimal) -> Self {
        let account_class = crate::reconciliation::detect_account_class(&narrative);
        Self {
            id,
            branch_code,
            narrative,
            balance,
            account_class,
        }
    }
}

/// Summary data extracted from one externally issued bank statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRecord {
    /// Name of the originating document (display only)
    pub source_name: String,
    /// Account identifier as extracted, not normalized
    pub account_number: String,
    /// Bank identifier reported by the statement, if any
    pub bank_name: Option<String>,
    /// Closing balance for the statement period
    pub ending_balance: BigDecimal,
    /// Statement date
    pub statement_date: NaiveDate,
}

impl StatementRecord {
    /// Create a statement record
    pub fn new(
        source_name: String,
        account_number: String,
        bank_name: Option<String>,
        ending_balance: BigDecimal,
        statement_date: NaiveDate,
    ) -> Self {
        Self {
            source_name,
            account_number,
            bank_name,
            ending_balance,
            statement_date,
        }
    }

    /// Bank name for display, falling back to "Unknown"
    pub fn bank_label(&self) -> &str {
        self.bank_name.as_deref().unwrap_or(UNKNOWN_BANK)
    }
}

/// Terminal classification of one reconciliation row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationStatus {
    /// Account matched and balances agree within tolerance
    Matched,
    /// Account matched but balances differ
    Variance,
    /// Ledger line with no statement
    UnmatchedLedger,
    /// Statement with no ledger line
    UnmatchedStatement,
}

impl ReconciliationStatus {
    /// All statuses, in report order
    pub const ALL: [ReconciliationStatus; 4] = [
        ReconciliationStatus::Matched,
        ReconciliationStatus::Variance,
        ReconciliationStatus::UnmatchedLedger,
        ReconciliationStatus::UnmatchedStatement,
    ];

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ReconciliationStatus::Matched => "MATCHED",
            ReconciliationStatus::Variance => "VARIANCE",
            ReconciliationStatus::UnmatchedLedger => "UNMATCHED_LEDGER",
            ReconciliationStatus::UnmatchedStatement => "UNMATCHED_STATEMENT",
        }
    }

    /// Human-readable badge text
    pub fn label(&self) -> &'static str {
        match self {
            ReconciliationStatus::Matched => "Balances agree",
            ReconciliationStatus::Variance => "Balance variance",
            ReconciliationStatus::UnmatchedLedger => "No statement found",
            ReconciliationStatus::UnmatchedStatement => "No ledger line found",
        }
    }

    /// Whether the row needs human review
    pub fn is_issue(&self) -> bool {
        match self {
            ReconciliationStatus::Matched => false,
            ReconciliationStatus::Variance
            | ReconciliationStatus::UnmatchedLedger
            | ReconciliationStatus::UnmatchedStatement => true,
        }
    }

    /// Whether the row is missing one of its sides
    pub fn is_unmatched(&self) -> bool {
        match self {
            ReconciliationStatus::Matched | ReconciliationStatus::Variance => false,
            ReconciliationStatus::UnmatchedLedger | ReconciliationStatus::UnmatchedStatement => {
                true
            }
        }
    }
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One row of the reconciliation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    /// Identifier derived from the contributing record(s)
    pub id: String,
    /// Classification, assigned once
    pub status: ReconciliationStatus,
    /// Ledger side (absent for unmatched statements)
    pub ledger_record: Option<LedgerRecord>,
    /// Statement side (absent for unmatched ledger lines)
    pub statement_record: Option<StatementRecord>,
    /// Signed variance; meaning depends on status
    pub variance_amount: BigDecimal,
    /// Bank inferred from the ledger narrative, or the statement's own bank
    pub detected_bank_name: String,
    /// Branch of the ledger side, or "N/A"
    pub detected_branch: String,
    /// Account class of the ledger side, or `Unknown`
    pub account_class: AccountClass,
    /// Normalized account number found in the ledger narrative
    pub detected_account_number: Option<String>,
}

/// Errors that can occur around a reconciliation run
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("Missing input: {0}")]
    MissingInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for reconciliation operations
pub type ReconResult<T> = Result<T, ReconError>;
