use super::candle::Candle;
use serde::{Deserialize, Serialize};

/// Support and resistance estimates over a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

impl SupportResistance {
    pub fn undefined() -> Self {
        Self {
            support: f64::NAN,
            resistance: f64::NAN,
        }
    }
}

/// Full rolling indicator columns for a series.
///
/// Every column has one value per candle; `NaN` marks "not enough history".
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    pub candles: Vec<Candle>,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub sma_mid: Vec<f64>,
    pub sma_long: Vec<f64>,
    pub vwap: Vec<f64>,
    pub obv: Vec<f64>,
    pub obv_slope: Vec<f64>,
    pub obv_sma_short: Vec<f64>,
    pub obv_sma_long: Vec<f64>,
    pub volume_sma_short: Vec<f64>,
    pub volume_sma_long: Vec<f64>,
    pub levels: Option<SupportResistance>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Project the values at index `i`.
    pub fn row(&self, i: usize) -> Option<IndicatorRow> {
        let candle = *self.candles.get(i)?;
        let at = |col: &[f64]| col.get(i).copied().unwrap_or(f64::NAN);
        let levels = self.levels.unwrap_or_else(SupportResistance::undefined);

        Some(IndicatorRow {
            time: candle.time,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            rsi: at(&self.rsi),
            macd: at(&self.macd),
            macd_signal: at(&self.macd_signal),
            macd_histogram: at(&self.macd_histogram),
            ema_fast: at(&self.ema_fast),
            ema_slow: at(&self.ema_slow),
            sma_mid: at(&self.sma_mid),
            sma_long: at(&self.sma_long),
            vwap: at(&self.vwap),
            obv: at(&self.obv),
            obv_slope: at(&self.obv_slope),
            obv_sma_short: at(&self.obv_sma_short),
            obv_sma_long: at(&self.obv_sma_long),
            volume_sma_short: at(&self.volume_sma_short),
            volume_sma_long: at(&self.volume_sma_long),
            support: levels.support,
            resistance: levels.resistance,
        })
    }

    /// The most recent row, the only one the classifier consumes.
    pub fn latest(&self) -> Option<IndicatorRow> {
        self.len().checked_sub(1).and_then(|i| self.row(i))
    }
}

/// Indicator values at a single timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorRow {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub sma_mid: f64,
    pub sma_long: f64,
    pub vwap: f64,
    pub obv: f64,
    pub obv_slope: f64,
    pub obv_sma_short: f64,
    pub obv_sma_long: f64,
    pub volume_sma_short: f64,
    pub volume_sma_long: f64,
    pub support: f64,
    pub resistance: f64,
}

impl IndicatorRow {
    /// A row with the given close and every indicator undefined.
    pub fn undefined(time: i64, close: f64) -> Self {
        Self {
            time,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
            rsi: f64::NAN,
            macd: f64::NAN,
            macd_signal: f64::NAN,
            macd_histogram: f64::NAN,
            ema_fast: f64::NAN,
            ema_slow: f64::NAN,
            sma_mid: f64::NAN,
            sma_long: f64::NAN,
            vwap: f64::NAN,
            obv: f64::NAN,
            obv_slope: f64::NAN,
            obv_sma_short: f64::NAN,
            obv_sma_long: f64::NAN,
            volume_sma_short: f64::NAN,
            volume_sma_long: f64::NAN,
            support: f64::NAN,
            resistance: f64::NAN,
        }
    }
}
