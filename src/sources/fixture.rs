//! In-memory provider for tests and offline runs.

use super::{finish_series, SeriesProvider, SeriesRequest};
use crate::error::FetchError;
use crate::types::{Interval, Series};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Serves canned series keyed by symbol and interval.
///
/// Failures and delays can be injected per symbol. Unregistered symbols
/// are reported as unknown.
#[derive(Default)]
pub struct FixtureProvider {
    series: HashMap<(String, Interval), Series>,
    failures: HashMap<String, FetchError>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series
            .insert((series.symbol().to_uppercase(), series.interval()), series);
        self
    }

    pub fn with_failure(mut self, symbol: &str, error: FetchError) -> Self {
        self.failures.insert(symbol.to_uppercase(), error);
        self
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_uppercase(), delay);
        self
    }

    /// Number of fetches served so far, failures included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeriesProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch_series(&self, request: &SeriesRequest) -> Result<Series, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let symbol = request.symbol.to_uppercase();

        if let Some(delay) = self.delays.get(&symbol) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = self.failures.get(&symbol) {
            return Err(error.clone());
        }

        let series = self
            .series
            .get(&(symbol.clone(), request.interval))
            .cloned()
            .ok_or(FetchError::UnknownSymbol(symbol))?;
        finish_series(series, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Candle;

    fn series(symbol: &str, bars: usize) -> Series {
        let candles = (0..bars)
            .map(|i| Candle::new(i as i64 * 86_400_000, 10.0, 11.0, 9.0, 10.0, 100.0))
            .collect();
        Series::new(symbol, Interval::OneDay, candles).unwrap()
    }

    #[tokio::test]
    async fn test_serves_registered_series_trimmed() {
        let provider = FixtureProvider::new().with_series(series("AAPL", 20));
        let got = provider
            .fetch_series(&SeriesRequest::bars("aapl", Interval::OneDay, 5))
            .await
            .unwrap();
        assert_eq!(got.len(), 5);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_is_unknown() {
        let provider = FixtureProvider::new();
        let err = provider
            .fetch_series(&SeriesRequest::bars("NOPE", Interval::OneDay, 5))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::UnknownSymbol("NOPE".to_string()));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let provider = FixtureProvider::new()
            .with_series(series("MSFT", 10))
            .with_failure("MSFT", FetchError::Unavailable("down".to_string()));
        let err = provider
            .fetch_series(&SeriesRequest::bars("MSFT", Interval::OneDay, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Unavailable(_)));
    }
}
