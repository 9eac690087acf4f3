//! Fail-soft extraction of many statement documents

use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use super::StatementDocument;
use crate::traits::{RecordValidator, StatementExtractor};
use crate::types::StatementRecord;

/// A document that could not be turned into a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub source_name: String,
    pub message: String,
}

/// Result of one upload batch: successes and failures side by side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchExtraction {
    pub statements: Vec<StatementRecord>,
    pub failures: Vec<ExtractionFailure>,
}

impl BatchExtraction {
    /// Whether every document in the batch succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Aggregate message naming each failing file and its cause
    pub fn error_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let details: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.source_name, f.message))
            .collect();
        Some(format!(
            "{} file(s) failed: {}",
            self.failures.len(),
            details.join(", ")
        ))
    }

    /// Move statements rejected by the validator into the failure list
    pub fn retain_valid(&mut self, validator: &dyn RecordValidator) {
        let mut kept = Vec::with_capacity(self.statements.len());
        for statement in self.statements.drain(..) {
            match validator.validate_statement(&statement) {
                Ok(()) => kept.push(statement),
                Err(e) => self.failures.push(ExtractionFailure {
                    source_name: statement.source_name.clone(),
                    message: e.to_string(),
                }),
            }
        }
        self.statements = kept;
    }
}

/// Run the extractor over every document with at most `concurrency`
/// calls in flight.
///
/// Results keep document order. One document failing never affects the
/// others. Each successful record takes the document's file name as its
/// source name.
#[instrument(skip_all, fields(documents = documents.len(), concurrency = concurrency))]
pub async fn extract_batch<E>(
    extractor: &E,
    documents: Vec<StatementDocument>,
    concurrency: usize,
) -> BatchExtraction
where
    E: StatementExtractor + ?Sized,
{
    let results: Vec<_> = stream::iter(documents)
        .map(|document| async move {
            let result = extractor.extract(&document).await;
            (document.name, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut batch = BatchExtraction::default();
    for (name, result) in results {
        match result {
            Ok(mut statement) => {
                statement.source_name = name;
                batch.statements.push(statement);
            }
            Err(e) => {
                warn!(document = %name, error = %e, "statement extraction failed");
                batch.failures.push(ExtractionFailure {
                    source_name: name,
                    message: e.to_string(),
                });
            }
        }
    }

    info!(
        extracted = batch.statements.len(),
        failed = batch.failures.len(),
        "statement batch processed"
    );
    batch
}
