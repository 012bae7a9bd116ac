//! MACD (Moving Average Convergence Divergence) indicator.

use super::{ema_series, mask_leading, Indicator};
use crate::types::Candle;

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// All EMAs are seeded from the first value. The MACD line is undefined for
/// the first `slow - 1` points and the signal line for `slow + signal - 2`.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

/// The three MACD columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period: fast_period.max(1),
            slow_period: slow_period.max(1),
            signal_period: signal_period.max(1),
        }
    }
}

impl Indicator for Macd {
    type Output = MacdLines;

    fn id(&self) -> &'static str {
        "macd"
    }

    fn name(&self) -> &'static str {
        "MACD"
    }

    fn min_periods(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    fn compute(&self, candles: &[Candle]) -> MacdLines {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let fast = ema_series(&closes, self.fast_period);
        let slow = ema_series(&closes, self.slow_period);
        let mut macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let mut signal = ema_series(&macd, self.signal_period);

        mask_leading(&mut macd, self.slow_period - 1);
        mask_leading(&mut signal, self.min_periods() - 1);

        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        MacdLines {
            macd,
            signal,
            histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::indicators::test_support::candles_from_closes;

    #[test]
    fn test_macd_min_periods() {
        assert_eq!(Macd::default().min_periods(), 34);
    }

    #[test]
    fn test_macd_warmup_masking() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let lines = Macd::default().compute(&candles_from_closes(&closes));
        assert!(lines.macd[24].is_nan());
        assert!(!lines.macd[25].is_nan());
        assert!(lines.signal[32].is_nan());
        assert!(!lines.signal[33].is_nan());
        assert!(lines.histogram[32].is_nan());
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        let lines = Macd::default().compute(&candles_from_closes(&closes));
        let last = lines.macd.len() - 1;
        assert!(lines.macd[last] > 0.0);
        // fast EMA pulls away from slow EMA, so MACD keeps rising above its signal
        assert!(lines.macd[last] > lines.signal[last]);
    }

    #[test]
    fn test_macd_matches_manual_recurrence() {
        let closes = [10.0, 11.0, 12.0, 11.5, 13.0];
        let lines = Macd::new(2, 3, 2).compute(&candles_from_closes(&closes));

        let fast = ema_series(&closes, 2);
        let slow = ema_series(&closes, 3);
        let expected: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        for t in 2..closes.len() {
            assert!((lines.macd[t] - expected[t]).abs() < 1e-12);
        }
        assert!(lines.macd[1].is_nan());
        assert!(lines.signal[2].is_nan());
        assert!(!lines.signal[3].is_nan());
    }
}
