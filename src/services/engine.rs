//! Indicator engine: `Series -> IndicatorSet`.

use crate::services::indicators::{
    sma_series, Ema, Indicator, Macd, Obv, ObvSlope, Rsi, RsiSmoothing, Sma,
    SupportResistanceFinder, Vwap,
};
use crate::types::{IndicatorSet, Series};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Periods for every indicator the engine computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    pub rsi_period: usize,
    pub rsi_smoothing: RsiSmoothing,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub sma_mid: usize,
    pub sma_long: usize,
    pub obv_slope_lag: usize,
    pub obv_sma_short: usize,
    pub obv_sma_long: usize,
    pub volume_sma_short: usize,
    pub volume_sma_long: usize,
    pub level_window: usize,
    pub level_points: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_smoothing: RsiSmoothing::Wilder,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            ema_fast: 20,
            ema_slow: 50,
            sma_mid: 50,
            sma_long: 200,
            obv_slope_lag: 6,
            obv_sma_short: 10,
            obv_sma_long: 20,
            volume_sma_short: 10,
            volume_sma_long: 20,
            level_window: 10,
            level_points: 3,
        }
    }
}

impl EngineParams {
    /// Longest lookback any column needs before its latest value is defined.
    pub fn longest_lookback(&self) -> usize {
        [
            self.rsi_period + 1,
            self.macd_slow + self.macd_signal - 1,
            self.ema_slow,
            self.sma_long,
            self.obv_slope_lag + 1,
            self.obv_sma_long,
            self.volume_sma_long,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Computes the full indicator bundle for a series.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: EngineParams,
}

impl IndicatorEngine {
    pub fn new(params: EngineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Compute every column. Pure: the same series always yields the same set.
    pub fn compute(&self, series: &Series) -> IndicatorSet {
        let p = &self.params;
        let candles = series.candles();

        let macd = Macd::new(p.macd_fast, p.macd_slow, p.macd_signal).compute(candles);
        let obv = Obv.compute(candles);
        let obv_slope = ObvSlope::new(p.obv_slope_lag).from_obv(&obv);
        let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
        let levels = if candles.is_empty() {
            None
        } else {
            Some(SupportResistanceFinder::new(p.level_window, p.level_points).compute(candles))
        };

        let set = IndicatorSet {
            candles: candles.to_vec(),
            rsi: Rsi::new(p.rsi_period, p.rsi_smoothing).compute(candles),
            macd: macd.macd,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            ema_fast: Ema::new(p.ema_fast).compute(candles),
            ema_slow: Ema::new(p.ema_slow).compute(candles),
            sma_mid: Sma::new(p.sma_mid).compute(candles),
            sma_long: Sma::new(p.sma_long).compute(candles),
            vwap: Vwap.compute(candles),
            obv_sma_short: sma_series(&obv, p.obv_sma_short),
            obv_sma_long: sma_series(&obv, p.obv_sma_long),
            obv,
            obv_slope,
            volume_sma_short: sma_series(&volumes, p.volume_sma_short),
            volume_sma_long: sma_series(&volumes, p.volume_sma_long),
            levels,
        };

        debug!(
            symbol = series.symbol(),
            interval = %series.interval(),
            bars = set.len(),
            "computed indicators"
        );
        set
    }
}
