//! Yahoo Finance chart API provider.
//!
//! Unofficial, keyless endpoint. Intraday history is capped by Yahoo, so
//! request windows are clamped per interval.

use super::{finish_series, validate_symbol, SeriesProvider, SeriesRequest};
use crate::error::FetchError;
use crate::types::{Candle, Interval, Series};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Yahoo uses hyphens for share classes (BRK-B, not BRK.B).
pub fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('.', "-")
}

/// Longest history Yahoo serves for an interval.
fn max_history(interval: Interval) -> Option<ChronoDuration> {
    match interval {
        Interval::OneMinute => Some(ChronoDuration::days(7)),
        Interval::FiveMinutes | Interval::FifteenMinutes | Interval::ThirtyMinutes => {
            Some(ChronoDuration::days(59))
        }
        Interval::OneHour => Some(ChronoDuration::days(729)),
        Interval::OneDay | Interval::OneWeek => None,
    }
}

/// Decode a chart payload into candles.
///
/// Bars with a missing open, high, low or close are skipped; a missing
/// volume counts as zero.
fn parse_chart(symbol: &str, body: &str) -> Result<Vec<Candle>, FetchError> {
    let data: YahooChartResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if let Some(error) = data.chart.error {
        return Err(if error.code == "Not Found" {
            FetchError::UnknownSymbol(symbol.to_string())
        } else {
            FetchError::Unavailable(format!("{}: {}", error.code, error.description))
        });
    }

    let result = data
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| FetchError::Empty(symbol.to_string()))?;

    let Some(timestamps) = result.timestamp else {
        return Err(FetchError::Empty(symbol.to_string()));
    };
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed("no quote block".to_string()))?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();
    let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();

    let candles = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            Some(Candle::new(
                ts * 1000,
                at(&opens, i)?,
                at(&highs, i)?,
                at(&lows, i)?,
                at(&closes, i)?,
                at(&volumes, i).unwrap_or(0.0),
            ))
        })
        .collect();
    Ok(candles)
}

/// Yahoo Finance series provider.
pub struct YahooProvider {
    client: Client,
}

impl YahooProvider {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SeriesProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_series(&self, request: &SeriesRequest) -> Result<Series, FetchError> {
        let symbol = normalize_yahoo_symbol(&request.symbol);
        validate_symbol(&symbol)?;
        let (mut start, end) = request.lookback.window(request.interval, Utc::now());
        if let Some(cap) = max_history(request.interval) {
            start = start.max(end - cap);
        }

        let url = format!("{}/{}", YAHOO_CHART_URL, symbol);
        debug!(symbol = %symbol, interval = %request.interval, "fetching yahoo chart");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", start.timestamp().to_string()),
                ("period2", end.timestamp().to_string()),
                ("interval", request.interval.yahoo_code().to_string()),
                ("includePrePost", "false".to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        // 404 carries a chart error body naming the symbol.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(FetchError::Unavailable(format!("HTTP {}", status)));
        }

        let (series, dropped) =
            Series::from_raw(request.symbol.clone(), request.interval, parse_chart(&symbol, &body)?);
        if dropped > 0 {
            warn!(symbol = %symbol, dropped, "dropped invalid or duplicate bars");
        }
        finish_series(series, request)
    }
}
