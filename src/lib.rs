//! # Reconcile Core
//!
//! Month-end cash reconciliation between an internal general-ledger export
//! and the closing balances read from bank statements.
//!
//! ## Features
//!
//! - **Ledger ingestion**: Header detection in exported balance sheets, with Thai and English labels
//! - **Statement extraction**: Trait-based document extraction with fail-soft, bounded-concurrency batches
//! - **Matching**: Greedy account-number matching with a configurable balance tolerance
//! - **Attribute detection**: Bank and account-class tagging from free-text narratives
//! - **Reporting**: Status filters, free-text search, summaries and CSV export
//! - **Session state**: Caller-owned accumulation of uploads, alerts and results
//!
//! ## Quick Start
//!
//! ```rust
//! use reconcile_core::{reconcile, LedgerRecord, ReconciliationStatus, StatementRecord};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let ledger = vec![LedgerRecord::new(
//!     "ledger-1".to_string(),
//!     "1001".to_string(),
//!     "KBANK C/A 123-4-56789-0".to_string(),
//!     BigDecimal::from(1000),
//! )];
//! let statements = vec![StatementRecord::new(
//!     "kbank.pdf".to_string(),
//!     "123-4-56789-0".to_string(),
//!     Some("KBANK".to_string()),
//!     BigDecimal::from(1000),
//!     NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
//! )];
//!
//! let outcomes = reconcile(&ledger, &statements);
//! assert_eq!(outcomes[0].status, ReconciliationStatus::Matched);
//! ```

pub mod config;
pub mod extract;
pub mod ingest;
pub mod reconciliation;
pub mod session;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use extract::*;
pub use ingest::{read_ledger_csv, IngestError};
pub use reconciliation::*;
pub use session::*;
pub use traits::*;
pub use types::*;
