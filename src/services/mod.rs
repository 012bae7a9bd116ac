pub mod cache;
pub mod classifier;
pub mod engine;
pub mod export;
pub mod indicators;
pub mod scanner;
pub mod strength;

pub use cache::Cache;
pub use classifier::{RuleSet, SignalClassifier};
pub use engine::{EngineParams, IndicatorEngine};
pub use export::OutputFormat;
pub use scanner::{ScanReport, ScanRow, ScanSettings, Scanner, SkippedTicker, StrengthReport, StrengthRow};
pub use strength::{classify_strength, IntervalReading};
