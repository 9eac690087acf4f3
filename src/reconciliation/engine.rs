//! Greedy account-number matching between ledger lines and bank statements

use bigdecimal::{BigDecimal, RoundingMode};
use tracing::{debug, info, instrument};

use crate::reconciliation::detect::{detect_bank, extract_embedded_account, normalize_account};
use crate::types::*;

/// Reconciliation engine
///
/// Holds only configuration; every call to [`ReconciliationEngine::reconcile`]
/// allocates its own working state, so one engine can be shared freely
/// across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationEngine {
    /// Strict upper bound on |ledger - statement| for a `Matched` row
    tolerance: BigDecimal,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationEngine {
    /// Create an engine with the default 0.01 tolerance
    pub fn new() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }

    /// Create an engine with a custom match tolerance
    pub fn with_tolerance(tolerance: BigDecimal) -> Self {
        Self { tolerance }
    }

    /// Tolerance used for `Matched` vs `Variance`
    pub fn tolerance(&self) -> &BigDecimal {
        &self.tolerance
    }

    /// Match ledger records against statements.
    ///
    /// Ledger-derived rows come first in ledger order, followed by every
    /// statement that was never claimed, in statement order. Each statement
    /// is claimed by at most one ledger record: the first ledger record (in
    /// input order) whose embedded account number is a substring of the
    /// statement's normalized account number.
    #[instrument(skip_all, fields(ledger = ledger.len(), statements = statements.len()))]
    pub fn reconcile(
        &self,
        ledger: &[LedgerRecord],
        statements: &[StatementRecord],
    ) -> Vec<ReconciliationOutcome> {
        let normalized: Vec<String> = statements
            .iter()
            .map(|s| normalize_account(&s.account_number))
            .collect();
        let mut consumed = vec![false; statements.len()];
        let mut outcomes = Vec::with_capacity(ledger.len() + statements.len());

        for record in ledger {
            let bank = detect_bank(&record.narrative);
            let candidate = extract_embedded_account(&record.narrative)
                .map(normalize_account)
                .filter(|c| !c.is_empty());

            let claimed = candidate.as_deref().and_then(|candidate| {
                (0..statements.len())
                    .find(|&idx| !consumed[idx] && normalized[idx].contains(candidate))
            });

            let outcome = match claimed {
                Some(idx) => {
                    consumed[idx] = true;
                    self.paired(record, &statements[idx], bank.code(), candidate)
                }
                None => unmatched_ledger(record, bank.code(), candidate),
            };
            debug!(
                ledger_id = %record.id,
                status = %outcome.status,
                variance = %outcome.variance_amount,
                "classified ledger record"
            );
            outcomes.push(outcome);
        }

        for (idx, statement) in statements.iter().enumerate() {
            if !consumed[idx] {
                outcomes.push(unmatched_statement(idx, statement));
            }
        }

        let matched = consumed.iter().filter(|c| **c).count();
        info!(
            outcomes = outcomes.len(),
            paired = matched,
            unclaimed_statements = statements.len() - matched,
            "reconciliation complete"
        );
        outcomes
    }

    fn paired(
        &self,
        record: &LedgerRecord,
        statement: &StatementRecord,
        bank: &str,
        candidate: Option<String>,
    ) -> ReconciliationOutcome {
        let diff = &record.balance - &statement.ending_balance;
        // Tolerance is checked on the exact difference, not the rounded one.
        let status = if diff.abs() < self.tolerance {
            ReconciliationStatus::Matched
        } else {
            ReconciliationStatus::Variance
        };

        ReconciliationOutcome {
            id: format!("rec-{}", record.id),
            status,
            ledger_record: Some(record.clone()),
            statement_record: Some(statement.clone()),
            variance_amount: round_amount(&diff),
            detected_bank_name: bank.to_string(),
            detected_branch: record.branch_code.clone(),
            account_class: record.account_class,
            detected_account_number: candidate,
        }
    }
}

/// Reconcile with the default engine
pub fn reconcile(
    ledger: &[LedgerRecord],
    statements: &[StatementRecord],
) -> Vec<ReconciliationOutcome> {
    ReconciliationEngine::new().reconcile(ledger, statements)
}

/// Round to two decimal places, half away from zero
pub fn round_amount(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

/// Default match tolerance, 0.01
pub fn default_tolerance() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(100)
}

fn unmatched_ledger(
    record: &LedgerRecord,
    bank: &str,
    candidate: Option<String>,
) -> ReconciliationOutcome {
    ReconciliationOutcome {
        id: format!("rec-{}", record.id),
        status: ReconciliationStatus::UnmatchedLedger,
        ledger_record: Some(record.clone()),
        statement_record: None,
        variance_amount: record.balance.clone(),
        detected_bank_name: bank.to_string(),
        detected_branch: record.branch_code.clone(),
        account_class: record.account_class,
        detected_account_number: candidate,
    }
}

fn unmatched_statement(index: usize, statement: &StatementRecord) -> ReconciliationOutcome {
    ReconciliationOutcome {
        id: format!("rec-stmt-{index}"),
        status: ReconciliationStatus::UnmatchedStatement,
        ledger_record: None,
        statement_record: Some(statement.clone()),
        variance_amount: -statement.ending_balance.clone(),
        detected_bank_name: statement.bank_label().to_string(),
        detected_branch: NOT_AVAILABLE.to_string(),
        account_class: AccountClass::Unknown,
        detected_account_number: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn ledger(id: &str, narrative: &str, balance: &str) -> LedgerRecord {
        LedgerRecord::new(
            id.to_string(),
            "B100".to_string(),
            narrative.to_string(),
            dec(balance),
        )
    }

    fn statement(name: &str, account: &str, balance: &str) -> StatementRecord {
        StatementRecord::new(
            name.to_string(),
            account.to_string(),
            Some("KBANK".to_string()),
            dec(balance),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_exact_match() {
        let ledger = vec![ledger("l1", "KBANK C/A 123-4-56789-0", "1000.00")];
        let statements = vec![statement("s1.pdf", "123-4-56789-0", "1000.00")];

        let outcomes = reconcile(&ledger, &statements);

        assert_eq!(outcomes.len(), 1);
        let row = &outcomes[0];
        assert_eq!(row.id, "rec-l1");
        assert_eq!(row.status, ReconciliationStatus::Matched);
        assert_eq!(row.variance_amount, dec("0"));
        assert_eq!(row.detected_bank_name, "KBANK");
        assert_eq!(row.detected_branch, "B100");
        assert_eq!(row.account_class, AccountClass::CurrentAccount);
        assert_eq!(row.detected_account_number.as_deref(), Some("1234567890"));
        assert!(row.ledger_record.is_some());
        assert!(row.statement_record.is_some());
    }

    #[test]
    fn test_tolerance_boundary() {
        let statements = vec![statement("s1.pdf", "1234567890", "100.00")];

        let under = reconcile(&[ledger("l1", "acct 1234567890", "100.009999")], &statements);
        assert_eq!(under[0].status, ReconciliationStatus::Matched);
        assert_eq!(under[0].variance_amount, dec("0.01"));

        let at = reconcile(&[ledger("l1", "acct 1234567890", "100.01")], &statements);
        assert_eq!(at[0].status, ReconciliationStatus::Variance);
        assert_eq!(at[0].variance_amount, dec("0.01"));

        let below = reconcile(&[ledger("l1", "acct 1234567890", "99.99")], &statements);
        assert_eq!(below[0].status, ReconciliationStatus::Variance);
        assert_eq!(below[0].variance_amount, dec("-0.01"));
    }

    #[test]
    fn test_variance_sign_and_rounding() {
        let statements = vec![statement("s1.pdf", "1234567890", "1500.125")];
        let outcomes = reconcile(&[ledger("l1", "acct 1234567890", "1000")], &statements);

        assert_eq!(outcomes[0].status, ReconciliationStatus::Variance);
        assert_eq!(outcomes[0].variance_amount, dec("-500.13"));
    }

    #[test]
    fn test_unmatched_ledger_keeps_full_balance() {
        let outcomes = reconcile(&[ledger("l1", "Petty cash", "-250.50")], &[]);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, ReconciliationStatus::UnmatchedLedger);
        assert_eq!(outcomes[0].variance_amount, dec("-250.50"));
        assert!(outcomes[0].statement_record.is_none());
        assert_eq!(outcomes[0].detected_account_number, None);
    }

    #[test]
    fn test_unmatched_statement_negates_balance() {
        let mut stmt = statement("s1.pdf", "9999999999", "750.25");
        stmt.bank_name = None;
        let outcomes = reconcile(&[], &[stmt]);

        assert_eq!(outcomes.len(), 1);
        let row = &outcomes[0];
        assert_eq!(row.id, "rec-stmt-0");
        assert_eq!(row.status, ReconciliationStatus::UnmatchedStatement);
        assert_eq!(row.variance_amount, dec("-750.25"));
        assert_eq!(row.detected_bank_name, "Unknown");
        assert_eq!(row.detected_branch, "N/A");
        assert_eq!(row.account_class, AccountClass::Unknown);
        assert!(row.ledger_record.is_none());
    }

    #[test]
    fn test_greedy_first_listed_statement_wins() {
        let statements = vec![
            statement("a.pdf", "1112223334", "10"),
            statement("b.pdf", "2223334445", "10"),
        ];
        let outcomes = reconcile(&[ledger("l1", "ref 222-333-4445", "10")], &statements);
        assert_eq!(
            outcomes[0].statement_record.as_ref().unwrap().source_name,
            "b.pdf"
        );

        // "2223334" is contained in both accounts: the first listed is claimed.
        let outcomes = reconcile(&[ledger("l1", "ref 22 23 33 4", "10")], &statements);
        assert_eq!(outcomes[0].detected_account_number.as_deref(), Some("2223334"));
        assert_eq!(
            outcomes[0].statement_record.as_ref().unwrap().source_name,
            "a.pdf"
        );
    }

    #[test]
    fn test_statement_consumed_once() {
        let ledger = vec![
            ledger("l1", "SCB 1234567890", "10"),
            ledger("l2", "SCB 1234567890 duplicate", "10"),
        ];
        let statements = vec![statement("s1.pdf", "1234567890", "10")];

        let outcomes = reconcile(&ledger, &statements);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].status, ReconciliationStatus::Matched);
        assert_eq!(outcomes[1].status, ReconciliationStatus::UnmatchedLedger);
    }

    #[test]
    fn test_output_order_and_coverage() {
        let ledger = vec![
            ledger("l1", "KBANK 1111111111", "1"),
            ledger("l2", "no account", "2"),
            ledger("l3", "BBL 3333333333", "3"),
        ];
        let statements = vec![
            statement("s0.pdf", "9999999999", "9"),
            statement("s1.pdf", "3333333333", "3"),
            statement("s2.pdf", "8888888888", "8"),
            statement("s3.pdf", "1111111111", "1"),
        ];

        let outcomes = reconcile(&ledger, &statements);

        let ids: Vec<&str> = outcomes.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["rec-l1", "rec-l2", "rec-l3", "rec-stmt-0", "rec-stmt-2"]
        );

        let claimed: Vec<&str> = outcomes
            .iter()
            .filter_map(|o| o.statement_record.as_ref())
            .map(|s| s.source_name.as_str())
            .collect();
        let unique: HashSet<&str> = claimed.iter().copied().collect();
        assert_eq!(claimed.len(), unique.len());
        assert_eq!(unique.len(), statements.len());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(reconcile(&[], &[]).is_empty());

        let outcomes = reconcile(
            &[ledger("l1", "KTB 1234567890", "5"), ledger("l2", "GSB 0987654321", "-7")],
            &[],
        );
        assert!(outcomes
            .iter()
            .all(|o| o.status == ReconciliationStatus::UnmatchedLedger));
        assert_eq!(outcomes[0].variance_amount, dec("5"));
        assert_eq!(outcomes[1].variance_amount, dec("-7"));
    }

    #[test]
    fn test_custom_tolerance() {
        let engine = ReconciliationEngine::with_tolerance(dec("1.00"));
        let outcomes = engine.reconcile(
            &[ledger("l1", "acct 1234567890", "100.50")],
            &[statement("s1.pdf", "1234567890", "100.00")],
        );

        assert_eq!(outcomes[0].status, ReconciliationStatus::Matched);
        assert_eq!(outcomes[0].variance_amount, dec("0.50"));
    }

    #[test]
    fn test_inputs_not_mutated() {
        let ledger = vec![ledger("l1", "acct 1234567890", "10")];
        let statements = vec![statement("s1.pdf", "1234567890", "12")];
        let ledger_before = ledger.clone();
        let statements_before = statements.clone();

        let first = reconcile(&ledger, &statements);
        let second = reconcile(&ledger, &statements);

        assert_eq!(ledger, ledger_before);
        assert_eq!(statements, statements_before);
        assert_eq!(first, second);
    }
}
