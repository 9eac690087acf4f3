//! Caller-owned reconciliation session
//!
//! Holds everything that accumulates between uploads: the loaded ledger,
//! statements gathered over several extraction batches, the last report,
//! and the alert shown to the user. The engine itself stays stateless and
//! receives the session's data by reference on each run.

use std::io::Read;
use tracing::{info, warn};

use crate::config::ReconciliationConfig;
use crate::extract::{extract_batch, BatchExtraction, StatementDocument};
use crate::ingest::read_ledger_csv;
use crate::reconciliation::{ReconciliationEngine, ReconciliationReport};
use crate::traits::*;
use crate::types::*;

/// Where a user-visible alert came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSource {
    /// Ledger file could not be ingested
    Ingestion,
    /// One or more statement documents failed
    Extraction,
    /// A run was requested before both inputs were loaded
    Run,
}

/// Message surfaced to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAlert {
    pub source: AlertSource,
    pub message: String,
}

/// Reconciliation session state
pub struct ReconciliationSession {
    config: ReconciliationConfig,
    engine: ReconciliationEngine,
    validator: Box<dyn RecordValidator>,
    ledger: Vec<LedgerRecord>,
    statements: Vec<StatementRecord>,
    report: Option<ReconciliationReport>,
    alert: Option<SessionAlert>,
}

impl Default for ReconciliationSession {
    fn default() -> Self {
        Self::new(ReconciliationConfig::default())
    }
}

impl ReconciliationSession {
    /// Create an empty session
    pub fn new(config: ReconciliationConfig) -> Self {
        Self::with_validator(config, Box::new(DefaultRecordValidator))
    }

    /// Create an empty session with a custom record validator
    pub fn with_validator(
        config: ReconciliationConfig,
        validator: Box<dyn RecordValidator>,
    ) -> Self {
        let engine = config.engine();
        Self {
            config,
            engine,
            validator,
            ledger: Vec::new(),
            statements: Vec::new(),
            report: None,
            alert: None,
        }
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    pub fn ledger(&self) -> &[LedgerRecord] {
        &self.ledger
    }

    pub fn statements(&self) -> &[StatementRecord] {
        &self.statements
    }

    /// Last completed report, if any
    pub fn report(&self) -> Option<&ReconciliationReport> {
        self.report.as_ref()
    }

    /// Current user-visible alert, if any
    pub fn alert(&self) -> Option<&SessionAlert> {
        self.alert.as_ref()
    }

    /// Replace the ledger with already-ingested records.
    ///
    /// On a validation failure the previous ledger is kept and an
    /// ingestion alert is raised.
    pub fn load_ledger(&mut self, records: Vec<LedgerRecord>) -> ReconResult<usize> {
        if let Err(e) = self.validator.validate_ledger(&records) {
            self.raise(AlertSource::Ingestion, e.to_string());
            return Err(e);
        }

        self.clear_alert_from(AlertSource::Ingestion);
        self.ledger = records;
        info!(records = self.ledger.len(), "ledger loaded");
        Ok(self.ledger.len())
    }

    /// Ingest a CSV ledger export and replace the current ledger with it.
    ///
    /// Ingestion is all-or-nothing; a failure leaves the previous ledger in
    /// place and raises an ingestion alert.
    pub fn load_ledger_csv<R: Read>(&mut self, reader: R) -> ReconResult<usize> {
        match read_ledger_csv(reader, &self.config) {
            Ok(records) => self.load_ledger(records),
            Err(e) => {
                let err = ReconError::from(e);
                self.raise(AlertSource::Ingestion, err.to_string());
                Err(err)
            }
        }
    }

    /// Extract a batch of statement documents and append the successes.
    ///
    /// Failures are reported together as one extraction alert; a batch
    /// without failures clears an earlier extraction alert but leaves an
    /// ingestion alert alone.
    pub async fn add_statement_batch<E>(
        &mut self,
        extractor: &E,
        documents: Vec<StatementDocument>,
    ) -> BatchExtraction
    where
        E: StatementExtractor + ?Sized,
    {
        if documents.is_empty() {
            return BatchExtraction::default();
        }

        let mut batch =
            extract_batch(extractor, documents, self.config.extraction_concurrency).await;
        batch.retain_valid(self.validator.as_ref());

        self.statements.extend(batch.statements.iter().cloned());

        match batch.error_summary() {
            Some(summary) => {
                warn!(failed = batch.failures.len(), "statement batch had failures");
                self.raise(AlertSource::Extraction, summary);
            }
            None => self.clear_alert_from(AlertSource::Extraction),
        }

        batch
    }

    /// Remove one accumulated statement by position
    pub fn remove_statement(&mut self, index: usize) -> Option<StatementRecord> {
        (index < self.statements.len()).then(|| self.statements.remove(index))
    }

    pub fn clear_statements(&mut self) {
        self.statements.clear();
    }

    pub fn clear_ledger(&mut self) {
        self.ledger.clear();
    }

    /// Dismiss the current alert
    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Reconcile the loaded ledger against the accumulated statements
    pub fn run(&mut self) -> ReconResult<&ReconciliationReport> {
        if self.ledger.is_empty() || self.statements.is_empty() {
            let err = ReconError::MissingInput(
                "both a ledger export and at least one bank statement are required".to_string(),
            );
            self.raise(AlertSource::Run, err.to_string());
            return Err(err);
        }

        let outcomes = self.engine.reconcile(&self.ledger, &self.statements);
        self.clear_alert_from(AlertSource::Run);
        Ok(&*self.report.insert(ReconciliationReport::new(outcomes)))
    }

    /// Discard all loaded data, results and alerts
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.statements.clear();
        self.report = None;
        self.alert = None;
    }

    fn raise(&mut self, source: AlertSource, message: String) {
        self.alert = Some(SessionAlert { source, message });
    }

    fn clear_alert_from(&mut self, source: AlertSource) {
        if self.alert.as_ref().is_some_and(|a| a.source == source) {
            self.alert = None;
        }
    }
}
