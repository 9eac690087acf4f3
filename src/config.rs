//! Runtime configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::reconciliation::{default_tolerance, ReconciliationEngine};
use crate::types::{ReconError, ReconResult};

/// Configuration for ingestion, extraction and matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Balance differences strictly below this are `Matched`
    pub match_tolerance: BigDecimal,
    /// How many leading rows are searched for the ledger header
    pub header_scan_rows: usize,
    /// Maximum documents extracted at the same time
    pub extraction_concurrency: usize,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            match_tolerance: default_tolerance(),
            header_scan_rows: 20,
            extraction_concurrency: 4,
        }
    }
}

impl ReconciliationConfig {
    /// Load configuration from `RECON_*` environment variables, falling back
    /// to defaults for anything unset
    pub fn from_env() -> ReconResult<Self> {
        let defaults = Self::default();

        let config = Self {
            match_tolerance: match env::var("RECON_MATCH_TOLERANCE") {
                Ok(raw) => BigDecimal::from_str(raw.trim()).map_err(|e| {
                    ReconError::Config(format!("RECON_MATCH_TOLERANCE '{raw}': {e}"))
                })?,
                Err(_) => defaults.match_tolerance,
            },
            header_scan_rows: env_usize("RECON_HEADER_SCAN_ROWS")?
                .unwrap_or(defaults.header_scan_rows),
            extraction_concurrency: env_usize("RECON_EXTRACTION_CONCURRENCY")?
                .unwrap_or(defaults.extraction_concurrency),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> ReconResult<()> {
        if self.match_tolerance <= BigDecimal::from(0) {
            return Err(ReconError::Config(
                "match_tolerance must be positive".to_string(),
            ));
        }
        if self.header_scan_rows == 0 {
            return Err(ReconError::Config(
                "header_scan_rows must be at least 1".to_string(),
            ));
        }
        if self.extraction_concurrency == 0 {
            return Err(ReconError::Config(
                "extraction_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a matching engine for this configuration
    pub fn engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::with_tolerance(self.match_tolerance.clone())
    }
}

fn env_usize(key: &str) -> ReconResult<Option<usize>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ReconError::Config(format!("{key} '{raw}': {e}"))),
        Err(_) => Ok(None),
    }
}
