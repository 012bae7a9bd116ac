//! Scout - technical indicator scanner for US equities

pub mod cli;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use services::{IndicatorEngine, RuleSet, ScanReport, Scanner, SignalClassifier};
pub use types::*;
