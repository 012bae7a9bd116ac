use crate::error::SeriesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Regular-session minutes in a US equity trading day.
const SESSION_MINUTES: i64 = 390;

/// Sampling interval of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1wk")]
    OneWeek,
}

impl Interval {
    pub const ALL: [Interval; 7] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::OneDay,
        Interval::OneWeek,
    ];

    /// Short code used on the command line and in output.
    pub fn code(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1wk",
        }
    }

    /// Interval parameter for the Yahoo chart API.
    pub fn yahoo_code(&self) -> &'static str {
        match self {
            Interval::OneHour => "60m",
            other => other.code(),
        }
    }

    /// Resolution parameter for the Finnhub candle API.
    pub fn finnhub_resolution(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1",
            Interval::FiveMinutes => "5",
            Interval::FifteenMinutes => "15",
            Interval::ThirtyMinutes => "30",
            Interval::OneHour => "60",
            Interval::OneDay => "D",
            Interval::OneWeek => "W",
        }
    }

    /// Bar length in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            Interval::OneMinute => 60,
            Interval::FiveMinutes => 300,
            Interval::FifteenMinutes => 900,
            Interval::ThirtyMinutes => 1800,
            Interval::OneHour => 3600,
            Interval::OneDay => 86_400,
            Interval::OneWeek => 604_800,
        }
    }

    pub fn is_intraday(&self) -> bool {
        self.seconds() < 86_400
    }

    /// Wall-clock window that should contain at least `bars` trading bars,
    /// padded for weekends and holidays.
    pub fn calendar_span(&self, bars: usize) -> chrono::Duration {
        let bars = bars.max(1) as i64;
        let days = match self {
            Interval::OneDay => bars * 7 / 5 + 10,
            Interval::OneWeek => bars * 7 + 7,
            intraday => {
                let minutes = intraday.seconds() / 60;
                let per_session = (SESSION_MINUTES / minutes).max(1);
                let sessions = (bars + per_session - 1) / per_session;
                sessions * 7 / 5 + 4
            }
        };
        chrono::Duration::days(days)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "1min" => Ok(Interval::OneMinute),
            "5m" | "5min" => Ok(Interval::FiveMinutes),
            "15m" | "15min" => Ok(Interval::FifteenMinutes),
            "30m" | "30min" => Ok(Interval::ThirtyMinutes),
            "1h" | "60m" | "60min" => Ok(Interval::OneHour),
            "1d" | "d" | "daily" => Ok(Interval::OneDay),
            "1wk" | "1w" | "w" | "weekly" => Ok(Interval::OneWeek),
            other => Err(format!("unsupported interval: {}", other)),
        }
    }
}

/// One OHLCV bar. `time` is the bar open in unix milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Typical price `(H + L + C) / 3`.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Check the OHLCV invariants.
    pub fn validate(&self) -> Result<(), SeriesError> {
        let fail = |reason| {
            Err(SeriesError::InvalidCandle {
                time: self.time,
                reason,
            })
        };

        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite()) {
            return fail("non-finite price");
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return fail("negative or non-finite volume");
        }
        if self.high < self.open.max(self.close) {
            return fail("high below open/close");
        }
        if self.low > self.open.min(self.close) {
            return fail("low above open/close");
        }
        Ok(())
    }
}

/// Chronological candles for one symbol at one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    symbol: String,
    interval: Interval,
    candles: Vec<Candle>,
}

impl Series {
    /// Build a series, rejecting anything that breaks the invariants.
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        candles: Vec<Candle>,
    ) -> Result<Self, SeriesError> {
        for (index, candle) in candles.iter().enumerate() {
            candle.validate()?;
            if index > 0 {
                let prev = candles[index - 1].time;
                if candle.time == prev {
                    return Err(SeriesError::DuplicateTimestamp { time: candle.time });
                }
                if candle.time < prev {
                    return Err(SeriesError::Unsorted { index });
                }
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            interval,
            candles,
        })
    }

    /// Build a series from provider output: sort, keep the last candle of
    /// each timestamp and drop invalid candles. Returns the number dropped.
    pub fn from_raw(
        symbol: impl Into<String>,
        interval: Interval,
        mut raw: Vec<Candle>,
    ) -> (Self, usize) {
        let total = raw.len();
        raw.retain(|c| c.validate().is_ok());
        raw.sort_by_key(|c| c.time);

        let mut candles: Vec<Candle> = Vec::with_capacity(raw.len());
        for candle in raw {
            match candles.last_mut() {
                Some(last) if last.time == candle.time => *last = candle,
                _ => candles.push(candle),
            }
        }

        let dropped = total - candles.len();
        (
            Self {
                symbol: symbol.into(),
                interval,
                candles,
            },
            dropped,
        )
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Keep only the most recent `n` candles.
    pub fn tail(mut self, n: usize) -> Self {
        if self.candles.len() > n {
            let start = self.candles.len() - n;
            self.candles.drain(..start);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(time: i64, close: f64) -> Candle {
        Candle::new(time, close, close + 1.0, close - 1.0, close, 100.0)
    }

    #[test]
    fn test_interval_round_trip_codes() {
        for interval in Interval::ALL {
            assert_eq!(interval.code().parse::<Interval>(), Ok(interval));
        }
        assert!("2h".parse::<Interval>().is_err());
    }

    #[test]
    fn test_interval_provider_codes() {
        assert_eq!(Interval::OneHour.yahoo_code(), "60m");
        assert_eq!(Interval::OneDay.yahoo_code(), "1d");
        assert_eq!(Interval::FifteenMinutes.finnhub_resolution(), "15");
        assert_eq!(Interval::OneDay.finnhub_resolution(), "D");
    }

    #[test]
    fn test_calendar_span_covers_bars() {
        // 26 fifteen-minute bars per session, 100 bars -> 4 sessions
        assert_eq!(Interval::FifteenMinutes.calendar_span(100).num_days(), 4 * 7 / 5 + 4);
        assert!(Interval::OneDay.calendar_span(250).num_days() >= 350);
        assert_eq!(Interval::OneWeek.calendar_span(10).num_days(), 77);
    }

    #[test]
    fn test_candle_validate() {
        assert!(candle(0, 10.0).validate().is_ok());
        let bad_high = Candle::new(0, 10.0, 9.0, 8.0, 9.5, 1.0);
        assert!(bad_high.validate().is_err());
        let bad_low = Candle::new(0, 10.0, 11.0, 10.5, 10.8, 1.0);
        assert!(bad_low.validate().is_err());
        let bad_volume = Candle::new(0, 10.0, 11.0, 9.0, 10.0, -1.0);
        assert!(bad_volume.validate().is_err());
        let nan = Candle::new(0, f64::NAN, 11.0, 9.0, 10.0, 1.0);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_typical_price() {
        let c = Candle::new(0, 10.0, 12.0, 9.0, 11.0, 5.0);
        assert!((c.typical_price() - 32.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_series_new_rejects_duplicates_and_disorder() {
        let dup = vec![candle(1, 10.0), candle(1, 11.0)];
        assert_eq!(
            Series::new("AAPL", Interval::OneDay, dup),
            Err(SeriesError::DuplicateTimestamp { time: 1 })
        );

        let unsorted = vec![candle(2, 10.0), candle(1, 11.0)];
        assert_eq!(
            Series::new("AAPL", Interval::OneDay, unsorted),
            Err(SeriesError::Unsorted { index: 1 })
        );
    }

    #[test]
    fn test_series_from_raw_normalizes() {
        let raw = vec![
            candle(3, 13.0),
            candle(1, 11.0),
            candle(2, 12.0),
            candle(2, 12.5),
            Candle::new(4, 10.0, 9.0, 8.0, 9.5, 1.0),
        ];
        let (series, dropped) = Series::from_raw("AAPL", Interval::OneDay, raw);
        assert_eq!(dropped, 2);
        assert_eq!(series.closes(), vec![11.0, 12.5, 13.0]);
    }

    #[test]
    fn test_series_tail() {
        let candles = (0..10).map(|i| candle(i, 10.0 + i as f64)).collect();
        let series = Series::new("MSFT", Interval::OneHour, candles).unwrap().tail(3);
        assert_eq!(series.len(), 3);
        assert_eq!(series.last().unwrap().close, 19.0);
    }
}
