//! Reconciliation of ledger balances against bank statements
//!
//! The engine pairs each ledger line with at most one statement by the
//! account number embedded in the ledger narrative, then classifies every
//! record as matched, variance, or unmatched on either side. Detection
//! heuristics live in [`detect`], read-only views in [`report`].

pub mod detect;
pub mod engine;
pub mod report;

pub use detect::*;
pub use engine::*;
pub use report::*;
