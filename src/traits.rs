//! Traits for the external collaborators around the engine

use async_trait::async_trait;
use std::collections::HashSet;

use crate::extract::{ExtractionError, StatementDocument};
use crate::reconciliation::normalize_account;
use crate::types::*;

/// Document-understanding backend that turns a bank-statement file into
/// a statement record
///
/// Implementations wrap whatever inference service reads the document.
/// A failure must be reported as an error for that document only; it
/// never yields a partial record.
#[async_trait]
pub trait StatementExtractor: Send + Sync {
    /// Extract the closing-balance summary of one statement
    async fn extract(&self, document: &StatementDocument)
        -> Result<StatementRecord, ExtractionError>;
}

/// Trait for implementing upstream record checks before matching
pub trait RecordValidator: Send + Sync {
    /// Validate a full ledger load
    fn validate_ledger(&self, records: &[LedgerRecord]) -> ReconResult<()>;

    /// Validate one extracted statement
    fn validate_statement(&self, statement: &StatementRecord) -> ReconResult<()>;
}

/// Default validator with basic identity rules
pub struct DefaultRecordValidator;

impl RecordValidator for DefaultRecordValidator {
    fn validate_ledger(&self, records: &[LedgerRecord]) -> ReconResult<()> {
        let mut seen = HashSet::new();
        for record in records {
            if record.id.trim().is_empty() {
                return Err(ReconError::Validation(
                    "Ledger record ID cannot be empty".to_string(),
                ));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(ReconError::Validation(format!(
                    "Duplicate ledger record ID '{}'",
                    record.id
                )));
            }
        }
        Ok(())
    }

    fn validate_statement(&self, statement: &StatementRecord) -> ReconResult<()> {
        if normalize_account(&statement.account_number).is_empty() {
            return Err(ReconError::Validation(format!(
                "Statement '{}' has no digits in account number '{}'",
                statement.source_name, statement.account_number
            )));
        }
        Ok(())
    }
}
