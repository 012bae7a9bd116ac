//! Market data providers and ticker universes.

pub mod finnhub;
pub mod fixture;
pub mod universe;
pub mod yahoo;

pub use finnhub::FinnhubProvider;
pub use fixture::FixtureProvider;
pub use universe::{normalize_tickers, CachedUniverse, FileUniverse, StaticUniverse, TickerUniverse};
pub use yahoo::YahooProvider;

use crate::error::FetchError;
use crate::types::{Interval, Series};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// How much history a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    /// The most recent `n` bars.
    Bars(usize),
    /// Every bar between two instants.
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Lookback {
    /// Stable text form used in cache keys.
    pub fn fingerprint(&self) -> String {
        match self {
            Lookback::Bars(n) => format!("bars{}", n),
            Lookback::Range { start, end } => {
                format!("{}-{}", start.timestamp(), end.timestamp())
            }
        }
    }

    /// Concrete time window for this lookback, ending at `now` for bar counts.
    pub fn window(&self, interval: Interval, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match *self {
            Lookback::Bars(n) => (now - interval.calendar_span(n), now),
            Lookback::Range { start, end } => (start, end),
        }
    }

    pub fn bar_limit(&self) -> Option<usize> {
        match self {
            Lookback::Bars(n) => Some(*n),
            Lookback::Range { .. } => None,
        }
    }
}

/// One series request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub symbol: String,
    pub interval: Interval,
    pub lookback: Lookback,
}

impl SeriesRequest {
    pub fn bars(symbol: impl Into<String>, interval: Interval, bars: usize) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            lookback: Lookback::Bars(bars),
        }
    }

    pub fn range(
        symbol: impl Into<String>,
        interval: Interval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            lookback: Lookback::Range { start, end },
        }
    }
}

/// A source of OHLCV series.
///
/// Implementations are shared across concurrent scan tasks.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Short name, used in logs and cache keys.
    fn name(&self) -> &str;

    async fn fetch_series(&self, request: &SeriesRequest) -> Result<Series, FetchError>;
}

/// Reject symbols that cannot go into a request URL verbatim.
///
/// Accepts upper-case letters, digits and `. - ^ =` (share classes, indices,
/// futures), up to 16 characters.
pub fn validate_symbol(symbol: &str) -> Result<(), FetchError> {
    let valid = !symbol.is_empty()
        && symbol.len() <= 16
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '^' | '='));
    if valid {
        Ok(())
    } else {
        Err(FetchError::InvalidSymbol(symbol.to_string()))
    }
}

/// Trim a provider series to the requested bar count and reject empties.
pub(crate) fn finish_series(series: Series, request: &SeriesRequest) -> Result<Series, FetchError> {
    if series.is_empty() {
        return Err(FetchError::Empty(request.symbol.clone()));
    }
    Ok(match request.lookback.bar_limit() {
        Some(n) => series.tail(n),
        None => series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_symbol() {
        for ok in ["AAPL", "BRK.B", "BRK-B", "^GSPC", "ES=F", "0700"] {
            assert_eq!(validate_symbol(ok), Ok(()), "{}", ok);
        }
        for bad in ["", "AAPL?X", "A/B", "AAPL&RESOLUTION=1", "aapl", "A B", "AAPL#"] {
            assert_eq!(
                validate_symbol(bad),
                Err(FetchError::InvalidSymbol(bad.to_string())),
                "{}",
                bad
            );
        }
        assert!(validate_symbol(&"A".repeat(17)).is_err());
    }

    #[test]
    fn test_lookback_fingerprint() {
        assert_eq!(Lookback::Bars(300).fingerprint(), "bars300");
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let end = Utc.timestamp_opt(1_700_086_400, 0).unwrap();
        assert_eq!(
            Lookback::Range { start, end }.fingerprint(),
            "1700000000-1700086400"
        );
    }

    #[test]
    fn test_bars_window_ends_now() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let (start, end) = Lookback::Bars(10).window(Interval::OneDay, now);
        assert_eq!(end, now);
        assert!(start < now);
    }
}
