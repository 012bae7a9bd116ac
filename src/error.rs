use std::time::Duration;
use thiserror::Error;

/// Violations of the candle / series invariants at the ingestion boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("invalid candle at {time}: {reason}")]
    InvalidCandle { time: i64, reason: &'static str },

    #[error("candles out of order at index {index}")]
    Unsorted { index: usize },

    #[error("duplicate timestamp {time}")]
    DuplicateTimestamp { time: i64 },
}

/// Errors returned by a market data provider.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("empty series for {0}")]
    Empty(String),

    #[error("insufficient history for {symbol}: {available} bars, need {required}")]
    InsufficientHistory {
        symbol: String,
        required: usize,
        available: usize,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else {
            FetchError::Unavailable(e.to_string())
        }
    }
}

/// Per-ticker failure inside a scan. Never aborts the batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("insufficient history: {available} bars, need {required}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("fetch timed out after {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    InvalidSeries(#[from] SeriesError),
}

/// Coarse classification of a skipped ticker, for counting and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    UnknownSymbol,
    InvalidSymbol,
    Unavailable,
    Malformed,
    Empty,
    InsufficientHistory,
    TimedOut,
}

impl ScanError {
    pub fn kind(&self) -> SkipKind {
        match self {
            ScanError::Fetch(FetchError::UnknownSymbol(_)) => SkipKind::UnknownSymbol,
            ScanError::Fetch(FetchError::InvalidSymbol(_)) => SkipKind::InvalidSymbol,
            ScanError::Fetch(FetchError::Unavailable(_)) => SkipKind::Unavailable,
            ScanError::Fetch(FetchError::Malformed(_)) => SkipKind::Malformed,
            ScanError::Fetch(FetchError::Empty(_)) => SkipKind::Empty,
            ScanError::Fetch(FetchError::InsufficientHistory { .. })
            | ScanError::InsufficientHistory { .. } => SkipKind::InsufficientHistory,
            ScanError::TimedOut(_) => SkipKind::TimedOut,
            ScanError::InvalidSeries(_) => SkipKind::Malformed,
        }
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("missing {0}")]
    Missing(&'static str),

    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rules file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
