//! In-memory statement extractor for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::extract::{ExtractedFields, ExtractionError, StatementDocument};
use crate::traits::StatementExtractor;
use crate::types::StatementRecord;

#[derive(Debug, Clone)]
enum CannedResponse {
    Json(String),
    Failure(String),
}

/// Extractor that answers from canned service responses keyed by
/// document name, for testing and development
#[derive(Debug, Clone)]
pub struct MemoryExtractor {
    responses: HashMap<String, CannedResponse>,
    today: NaiveDate,
    calls: Arc<AtomicUsize>,
}

impl MemoryExtractor {
    /// Create an extractor with no responses; `today` fills missing dates
    pub fn new(today: NaiveDate) -> Self {
        Self {
            responses: HashMap::new(),
            today,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer `document_name` with a JSON body in the service's format
    pub fn with_response(mut self, document_name: &str, json: &str) -> Self {
        self.responses
            .insert(document_name.to_string(), CannedResponse::Json(json.to_string()));
        self
    }

    /// Fail `document_name` with a service error
    pub fn with_failure(mut self, document_name: &str, message: &str) -> Self {
        self.responses.insert(
            document_name.to_string(),
            CannedResponse::Failure(message.to_string()),
        );
        self
    }

    /// Number of extraction calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatementExtractor for MemoryExtractor {
    async fn extract(
        &self,
        document: &StatementDocument,
    ) -> Result<StatementRecord, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.responses.get(&document.name) {
            Some(CannedResponse::Json(body)) => {
                ExtractedFields::from_json(body)?.into_record(&document.name, self.today)
            }
            Some(CannedResponse::Failure(message)) => {
                Err(ExtractionError::Service(message.clone()))
            }
            None => Err(ExtractionError::Unreadable(format!(
                "no canned response for '{}'",
                document.name
            ))),
        }
    }
}
