//! Simple Moving Average (SMA) indicator.

use super::{sma_series, Indicator};
use crate::types::Candle;

/// SMA of close over a fixed window; undefined until `period` closes exist.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }
}

impl Indicator for Sma {
    type Output = Vec<f64>;

    fn id(&self) -> &'static str {
        match self.period {
            50 => "sma50",
            200 => "sma200",
            _ => "sma",
        }
    }

    fn name(&self) -> &'static str {
        "Simple Moving Average"
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        sma_series(&closes, self.period)
    }
}
