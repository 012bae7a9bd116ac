//! Batch scanner: fetch, compute and classify many tickers concurrently.
//!
//! One ticker's failure never aborts the batch. Results are sorted before
//! they are returned, so output does not depend on completion order.

use crate::error::{ScanError, SkipKind};
use crate::services::cache::{series_fingerprint, Cache};
use crate::services::classifier::{RuleSet, SignalClassifier};
use crate::services::engine::{EngineParams, IndicatorEngine};
use crate::services::strength::{classify_strength_with_rule, IntervalReading};
use crate::sources::{normalize_tickers, validate_symbol, SeriesProvider, SeriesRequest};
use crate::types::{
    Direction, EntryPlan, IndicatorRow, Interval, LongTermSignal, PositionReview, ScoreResult,
    Sentiment, Series, SignalSet, SignalState, Strength, Trend,
};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Batch execution knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    /// Maximum fetches in flight.
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    /// Series shorter than this are skipped as insufficient history.
    pub min_bars: usize,
    /// Bars requested per series.
    pub lookback_bars: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            fetch_timeout: Duration::from_secs(15),
            min_bars: 50,
            lookback_bars: 300,
        }
    }
}

/// Classified latest bar for one ticker.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRow {
    pub ticker: String,
    pub interval: Interval,
    pub direction: Direction,
    pub bars: usize,
    pub row: IndicatorRow,
    pub signals: SignalSet,
    pub score: ScoreResult,
    pub trend: Trend,
    pub sentiment: Sentiment,
    pub long_term: LongTermSignal,
    pub entry_signal: SignalState,
    pub entry_plan: EntryPlan,
}

impl ScanRow {
    pub fn verdict_label(&self) -> &'static str {
        self.score.verdict.label(self.direction)
    }
}

/// A ticker (or ticker/interval pair) left out of the results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub interval: Interval,
    pub kind: SkipKind,
    pub reason: String,
}

impl SkippedTicker {
    fn new(ticker: String, interval: Interval, error: &ScanError) -> Self {
        Self {
            ticker,
            interval,
            kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub interval: Interval,
    pub direction: Direction,
    /// Sorted by score descending, then ticker.
    pub rows: Vec<ScanRow>,
    /// Sorted by ticker.
    pub skipped: Vec<SkippedTicker>,
}

impl ScanReport {
    /// Rows with exactly this verdict label, e.g. "Strong Buy".
    pub fn with_verdict(&self, label: &str) -> Vec<&ScanRow> {
        self.rows
            .iter()
            .filter(|r| r.verdict_label() == label)
            .collect()
    }
}

/// Multi-interval strength for one ticker.
#[derive(Debug, Clone, Serialize)]
pub struct StrengthRow {
    pub ticker: String,
    pub readings: Vec<IntervalReading>,
    pub strength: Strength,
    pub rule: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrengthReport {
    pub intervals: Vec<Interval>,
    /// Sorted by ticker.
    pub rows: Vec<StrengthRow>,
    /// One entry per failed ticker/interval pair, sorted by ticker then interval.
    pub skipped: Vec<SkippedTicker>,
}

pub struct Scanner {
    provider: Arc<dyn SeriesProvider>,
    engine: IndicatorEngine,
    classifier: SignalClassifier,
    settings: ScanSettings,
    cache: Option<Arc<Cache<Series>>>,
}

impl Scanner {
    pub fn new(provider: Arc<dyn SeriesProvider>) -> Self {
        Self {
            provider,
            engine: IndicatorEngine::default(),
            classifier: SignalClassifier::default(),
            settings: ScanSettings::default(),
            cache: None,
        }
    }

    pub fn with_params(mut self, params: EngineParams) -> Self {
        self.engine = IndicatorEngine::new(params);
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.classifier = SignalClassifier::new(rules);
        self
    }

    pub fn with_settings(mut self, settings: ScanSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_cache(mut self, cache: Arc<Cache<Series>>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub fn classifier(&self) -> &SignalClassifier {
        &self.classifier
    }

    /// Fetch (or reuse) a series and enforce the minimum history.
    async fn load(&self, ticker: &str, interval: Interval) -> Result<Series, ScanError> {
        validate_symbol(ticker)?;
        let request = SeriesRequest::bars(ticker, interval, self.settings.lookback_bars);
        let key = series_fingerprint(
            self.provider.name(),
            ticker,
            interval,
            &request.lookback.fingerprint(),
        );

        let cached = self.cache.as_ref().and_then(|c| c.get(&key));
        let series = match cached {
            Some(series) => {
                debug!(ticker, %interval, "series cache hit");
                series
            }
            None => {
                let limit = self.settings.fetch_timeout;
                let series = match timeout(limit, self.provider.fetch_series(&request)).await {
                    Ok(result) => result?,
                    Err(_) => return Err(ScanError::TimedOut(limit)),
                };
                if let Some(cache) = &self.cache {
                    cache.insert(key, series.clone());
                }
                series
            }
        };

        if series.len() < self.settings.min_bars {
            return Err(ScanError::InsufficientHistory {
                required: self.settings.min_bars,
                available: series.len(),
            });
        }
        Ok(series)
    }

    /// Latest indicator row for a loaded series.
    fn latest_row(&self, series: &Series) -> Result<IndicatorRow, ScanError> {
        self.engine
            .compute(series)
            .latest()
            .ok_or(ScanError::InsufficientHistory {
                required: self.settings.min_bars.max(1),
                available: 0,
            })
    }

    /// Classify one series. Pure apart from logging.
    pub fn analyze(&self, series: &Series, direction: Direction) -> Option<ScanRow> {
        let row = self.engine.compute(series).latest()?;
        let signals = self.classifier.classify(&row, direction);
        let score = self.classifier.score(&signals);

        Some(ScanRow {
            ticker: series.symbol().to_string(),
            interval: series.interval(),
            direction,
            bars: series.len(),
            trend: self.classifier.trend(&row),
            sentiment: Sentiment::from_slope(row.obv_slope),
            long_term: self.classifier.long_term(&row),
            entry_signal: self.classifier.entry_signal(&row),
            entry_plan: self.classifier.entry_plan(&row),
            row,
            signals,
            score,
        })
    }

    async fn scan_one(&self, ticker: &str, interval: Interval, direction: Direction) -> Result<ScanRow, ScanError> {
        let series = self.load(ticker, interval).await?;
        self.analyze(&series, direction)
            .ok_or(ScanError::InsufficientHistory {
                required: self.settings.min_bars.max(1),
                available: 0,
            })
    }

    /// Scan a batch of tickers on one interval.
    pub async fn scan<S: AsRef<str>>(
        &self,
        tickers: &[S],
        interval: Interval,
        direction: Direction,
    ) -> ScanReport {
        let tickers = normalize_tickers(tickers);
        info!(count = tickers.len(), %interval, %direction, "starting scan");

        let results: Vec<(String, Result<ScanRow, ScanError>)> = stream::iter(tickers)
            .map(|ticker| async move {
                let result = self.scan_one(&ticker, interval, direction).await;
                (ticker, result)
            })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let mut rows = Vec::new();
        let mut skipped = Vec::new();
        for (ticker, result) in results {
            match result {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(ticker = %ticker, %interval, error = %e, "skipping ticker");
                    skipped.push(SkippedTicker::new(ticker, interval, &e));
                }
            }
        }

        rows.sort_by(|a, b| {
            b.score
                .score
                .cmp(&a.score.score)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });
        skipped.sort_by(|a, b| a.ticker.cmp(&b.ticker));

        info!(rows = rows.len(), skipped = skipped.len(), "scan complete");
        ScanReport {
            interval,
            direction,
            rows,
            skipped,
        }
    }

    async fn read_interval(&self, ticker: &str, interval: Interval) -> Result<IntervalReading, ScanError> {
        let series = self.load(ticker, interval).await?;
        let row = self.latest_row(&series)?;
        Ok(IntervalReading::from_row(
            interval,
            self.classifier.trend(&row),
            &row,
        ))
    }

    /// Classify multi-interval strength for a batch of tickers.
    ///
    /// A failed interval contributes an `Unknown` reading and a skipped
    /// entry; the ticker itself still gets a row.
    pub async fn scan_strength<S: AsRef<str>>(
        &self,
        tickers: &[S],
        intervals: &[Interval],
    ) -> StrengthReport {
        let tickers = normalize_tickers(tickers);
        let pairs: Vec<(usize, String, usize, Interval)> = tickers
            .iter()
            .enumerate()
            .flat_map(|(ti, t)| {
                intervals
                    .iter()
                    .enumerate()
                    .map(move |(ii, &interval)| (ti, t.clone(), ii, interval))
            })
            .collect();
        info!(tickers = tickers.len(), intervals = intervals.len(), "starting strength scan");

        let results: Vec<_> = stream::iter(pairs)
            .map(|(ti, ticker, ii, interval)| async move {
                let result = self.read_interval(&ticker, interval).await;
                (ti, ii, ticker, interval, result)
            })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let mut readings: Vec<Vec<IntervalReading>> = tickers
            .iter()
            .map(|_| intervals.iter().map(|&i| IntervalReading::unknown(i)).collect())
            .collect();
        let mut skipped = Vec::new();
        for (ti, ii, ticker, interval, result) in results {
            match result {
                Ok(reading) => readings[ti][ii] = reading,
                Err(e) => {
                    warn!(ticker = %ticker, %interval, error = %e, "interval unavailable");
                    skipped.push(SkippedTicker::new(ticker, interval, &e));
                }
            }
        }

        let mut rows: Vec<StrengthRow> = tickers
            .into_iter()
            .zip(readings)
            .map(|(ticker, readings)| {
                let (strength, rule) = classify_strength_with_rule(&readings);
                StrengthRow {
                    ticker,
                    readings,
                    strength,
                    rule,
                }
            })
            .collect();
        rows.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        skipped.sort_by(|a, b| a.ticker.cmp(&b.ticker).then(a.interval.cmp(&b.interval)));

        StrengthReport {
            intervals: intervals.to_vec(),
            rows,
            skipped,
        }
    }

    /// Exit review for an open long position.
    pub async fn review_position(
        &self,
        ticker: &str,
        interval: Interval,
        buy_price: f64,
    ) -> Result<PositionReview, ScanError> {
        let ticker = ticker.trim().to_uppercase();
        let series = self.load(&ticker, interval).await?;
        let row = self.latest_row(&series)?;
        Ok(self.classifier.review_position(&ticker, &row, buy_price))
    }
}
