//! Utility modules

pub mod memory_extractor;

pub use memory_extractor::*;
