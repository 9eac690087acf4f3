//! Bank-statement extraction contract
//!
//! The document-understanding service itself sits behind the
//! [`StatementExtractor`](crate::traits::StatementExtractor) trait. This
//! module owns what surrounds it: the input document, validation of the
//! fields the service returns, and fail-soft batch processing.

pub mod batch;

pub use batch::*;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::types::{StatementRecord, UNKNOWN_BANK};

/// Per-document extraction errors
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Required field missing: {0}")]
    MissingField(&'static str),
    #[error("Invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
    #[error("Document unreadable: {0}")]
    Unreadable(String),
    #[error("Extraction service error: {0}")]
    Service(String),
    #[error("Malformed extraction response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// One uploaded bank-statement file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementDocument {
    /// File name, used as the statement's source name
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl StatementDocument {
    /// Create a document with an explicit MIME type
    pub fn new(name: String, mime_type: String, bytes: Vec<u8>) -> Self {
        Self {
            name,
            mime_type,
            bytes,
        }
    }

    /// Read a document from disk, guessing the MIME type from its extension
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = guess_mime_type(&name).to_string();
        Ok(Self::new(name, mime_type, bytes))
    }
}

/// MIME type for a statement file name; unknown types are sent as JPEG
pub fn guess_mime_type(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "image/jpeg",
    }
}

/// Fields returned by the document-understanding service
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub account_number: Option<String>,
    pub ending_balance: Option<serde_json::Value>,
    pub statement_date: Option<String>,
    pub bank_name: Option<String>,
}

impl ExtractedFields {
    /// Parse the service's JSON response body
    pub fn from_json(body: &str) -> Result<Self, ExtractionError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Validate the fields and build a statement record.
    ///
    /// Account number and ending balance are required. A missing or
    /// unparseable date becomes `today`; a blank or "Unknown" bank name
    /// becomes `None`.
    pub fn into_record(
        self,
        source_name: &str,
        today: NaiveDate,
    ) -> Result<StatementRecord, ExtractionError> {
        let account_number = self
            .account_number
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(ExtractionError::MissingField("accountNumber"))?;

        let ending_balance = match self.ending_balance {
            None | Some(serde_json::Value::Null) => {
                return Err(ExtractionError::MissingField("endingBalance"))
            }
            Some(value) => parse_balance(&value)?,
        };

        let statement_date = match self.statement_date.as_deref().map(str::trim) {
            None | Some("") => today,
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|_| {
                tracing::warn!(
                    source = source_name,
                    value = raw,
                    "unparseable statement date, using today"
                );
                today
            }),
        };

        let bank_name = self
            .bank_name
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty() && !b.eq_ignore_ascii_case(UNKNOWN_BANK));

        Ok(StatementRecord::new(
            source_name.to_string(),
            account_number,
            bank_name,
            ending_balance,
            statement_date,
        ))
    }
}

fn parse_balance(value: &serde_json::Value) -> Result<BigDecimal, ExtractionError> {
    let raw = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.replace(',', "").trim().to_string(),
        other => other.to_string(),
    };
    BigDecimal::from_str(&raw).map_err(|_| ExtractionError::InvalidField {
        field: "endingBalance",
        value: value.to_string(),
    })
}
