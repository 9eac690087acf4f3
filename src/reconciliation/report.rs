//! Read-only reporting over reconciliation outcomes

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::io::Write;
use uuid::Uuid;

use crate::types::*;

/// Status filter applied by the reporting view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    /// Every row
    #[default]
    All,
    /// Every row that needs review (anything but `Matched`)
    Issues,
    /// Rows with exactly this status
    Only(ReconciliationStatus),
}

impl StatusFilter {
    /// Whether a status passes this filter
    pub fn accepts(&self, status: ReconciliationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Issues => status.is_issue(),
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

/// Free-text search over bank, branch, narrative and statement account.
///
/// Bank, branch and narrative compare case-insensitively; the statement
/// account number is compared as extracted.
pub fn matches_search(outcome: &ReconciliationOutcome, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();

    outcome.detected_bank_name.to_lowercase().contains(&needle)
        || outcome.detected_branch.to_lowercase().contains(&needle)
        || outcome
            .ledger_record
            .as_ref()
            .is_some_and(|l| l.narrative.to_lowercase().contains(&needle))
        || outcome
            .statement_record
            .as_ref()
            .is_some_and(|s| s.account_number.contains(&needle))
}

/// Apply a status filter and a search query, keeping result order
pub fn filter_outcomes<'a>(
    outcomes: &'a [ReconciliationOutcome],
    filter: StatusFilter,
    query: &str,
) -> Vec<&'a ReconciliationOutcome> {
    outcomes
        .iter()
        .filter(|o| filter.accepts(o.status) && matches_search(o, query))
        .collect()
}

/// Per-status counts for a result set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub matched: usize,
    pub variance: usize,
    pub unmatched_ledger: usize,
    pub unmatched_statement: usize,
    /// Sum of |variance| over `Variance` rows
    pub total_abs_variance: BigDecimal,
}

impl ReportSummary {
    /// Tally a result set
    pub fn from_outcomes(outcomes: &[ReconciliationOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };

        for outcome in outcomes {
            match outcome.status {
                ReconciliationStatus::Matched => summary.matched += 1,
                ReconciliationStatus::Variance => {
                    summary.variance += 1;
                    summary.total_abs_variance += outcome.variance_amount.abs();
                }
                ReconciliationStatus::UnmatchedLedger => summary.unmatched_ledger += 1,
                ReconciliationStatus::UnmatchedStatement => summary.unmatched_statement += 1,
            }
        }

        summary
    }

    /// Rows missing one side
    pub fn unmatched(&self) -> usize {
        self.unmatched_ledger + self.unmatched_statement
    }

    /// Count for one status
    pub fn count(&self, status: ReconciliationStatus) -> usize {
        match status {
            ReconciliationStatus::Matched => self.matched,
            ReconciliationStatus::Variance => self.variance,
            ReconciliationStatus::UnmatchedLedger => self.unmatched_ledger,
            ReconciliationStatus::UnmatchedStatement => self.unmatched_statement,
        }
    }
}

/// A completed reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Unique identifier of this run
    pub run_id: Uuid,
    /// When the run finished (UTC)
    pub generated_at: NaiveDateTime,
    /// Rows in engine output order
    pub outcomes: Vec<ReconciliationOutcome>,
    /// Counts over `outcomes`
    pub summary: ReportSummary,
}

impl ReconciliationReport {
    /// Wrap engine output with a run id, timestamp and summary
    pub fn new(outcomes: Vec<ReconciliationOutcome>) -> Self {
        let summary = ReportSummary::from_outcomes(&outcomes);
        Self {
            run_id: Uuid::new_v4(),
            generated_at: chrono::Utc::now().naive_utc(),
            outcomes,
            summary,
        }
    }

    /// Filtered, searched view of the rows
    pub fn view(&self, filter: StatusFilter, query: &str) -> Vec<&ReconciliationOutcome> {
        filter_outcomes(&self.outcomes, filter, query)
    }
}

const CSV_HEADER: [&str; 11] = [
    "id",
    "status",
    "bank",
    "branch",
    "account_class",
    "detected_account",
    "ledger_narrative",
    "ledger_balance",
    "statement_account",
    "statement_balance",
    "variance",
];

/// Export outcomes as CSV; absent sides become empty cells
pub fn write_outcomes_csv<W: Write>(
    writer: W,
    outcomes: &[ReconciliationOutcome],
) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADER)?;

    for outcome in outcomes {
        let ledger = outcome.ledger_record.as_ref();
        let statement = outcome.statement_record.as_ref();
        out.write_record([
            outcome.id.clone(),
            outcome.status.code().to_string(),
            outcome.detected_bank_name.clone(),
            outcome.detected_branch.clone(),
            outcome.account_class.label().to_string(),
            outcome.detected_account_number.clone().unwrap_or_default(),
            ledger.map(|l| l.narrative.clone()).unwrap_or_default(),
            ledger.map(|l| l.balance.to_string()).unwrap_or_default(),
            statement
                .map(|s| s.account_number.clone())
                .unwrap_or_default(),
            statement
                .map(|s| s.ending_balance.to_string())
                .unwrap_or_default(),
            outcome.variance_amount.to_string(),
        ])?;
    }

    out.flush()?;
    Ok(())
}
