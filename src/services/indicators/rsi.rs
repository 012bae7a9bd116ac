//! Relative Strength Index (RSI) indicator.

use super::Indicator;
use crate::types::Candle;
use serde::{Deserialize, Serialize};

/// How average gain / average loss are smoothed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RsiSmoothing {
    /// Rolling mean of the last `period` deltas.
    Simple,
    /// Seed with the simple mean, then `(prev·(n−1) + x) / n`.
    #[default]
    Wilder,
}

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent
/// losses. `RSI = 100 − 100/(1+RS)` with `RS = avg_gain/avg_loss`; when the
/// average loss is zero the RSI is 100. The first `period` points are NaN.
pub struct Rsi {
    period: usize,
    smoothing: RsiSmoothing,
}

impl Default for Rsi {
    fn default() -> Self {
        Self {
            period: 14,
            smoothing: RsiSmoothing::Wilder,
        }
    }
}

impl Rsi {
    pub fn new(period: usize, smoothing: RsiSmoothing) -> Self {
        Self {
            period: period.max(1),
            smoothing,
        }
    }

    fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            return 100.0;
        }
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

impl Indicator for Rsi {
    type Output = Vec<f64>;

    fn id(&self) -> &'static str {
        "rsi"
    }

    fn name(&self) -> &'static str {
        "Relative Strength Index"
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = self.period;
        let mut out = vec![f64::NAN; candles.len()];
        if candles.len() <= n {
            return out;
        }

        // gains[i] / losses[i] hold the delta ending at candle i + 1
        let (gains, losses): (Vec<f64>, Vec<f64>) = candles
            .windows(2)
            .map(|w| {
                let change = w[1].close - w[0].close;
                (change.max(0.0), (-change).max(0.0))
            })
            .unzip();

        let mut avg_gain = gains[..n].iter().sum::<f64>() / n as f64;
        let mut avg_loss = losses[..n].iter().sum::<f64>() / n as f64;
        out[n] = Self::from_averages(avg_gain, avg_loss);

        for i in n..gains.len() {
            match self.smoothing {
                RsiSmoothing::Simple => {
                    let window = i + 1 - n..=i;
                    avg_gain = gains[window.clone()].iter().sum::<f64>() / n as f64;
                    avg_loss = losses[window].iter().sum::<f64>() / n as f64;
                }
                RsiSmoothing::Wilder => {
                    avg_gain = (avg_gain * (n - 1) as f64 + gains[i]) / n as f64;
                    avg_loss = (avg_loss * (n - 1) as f64 + losses[i]) / n as f64;
                }
            }
            out[i + 1] = Self::from_averages(avg_gain, avg_loss);
        }

        out
    }
}
