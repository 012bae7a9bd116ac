//! On-Balance Volume (OBV) indicator.

use super::{lagged_difference, Indicator};
use crate::types::Candle;

/// OBV (On-Balance Volume) indicator.
///
/// Cumulative volume indicator, starting at zero:
/// - If close > previous close: OBV += volume
/// - If close < previous close: OBV -= volume
/// - Otherwise unchanged
#[derive(Default)]
pub struct Obv;

impl Indicator for Obv {
    type Output = Vec<f64>;

    fn id(&self) -> &'static str {
        "obv"
    }

    fn name(&self) -> &'static str {
        "On-Balance Volume"
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut obv = 0.0;
        let mut values = Vec::with_capacity(candles.len());

        for (i, candle) in candles.iter().enumerate() {
            if i > 0 {
                let prev = candles[i - 1].close;
                if candle.close > prev {
                    obv += candle.volume;
                } else if candle.close < prev {
                    obv -= candle.volume;
                }
            }
            values.push(obv);
        }
        values
    }
}

/// Change in OBV over a fixed number of bars.
///
/// Positive means volume is accumulating, negative distributing.
pub struct ObvSlope {
    lag: usize,
}

impl Default for ObvSlope {
    fn default() -> Self {
        Self { lag: 6 }
    }
}

impl ObvSlope {
    pub fn new(lag: usize) -> Self {
        Self { lag: lag.max(1) }
    }

    /// Slope column from an already computed OBV column.
    pub fn from_obv(&self, obv: &[f64]) -> Vec<f64> {
        lagged_difference(obv, self.lag)
    }
}

impl Indicator for ObvSlope {
    type Output = Vec<f64>;

    fn id(&self) -> &'static str {
        "obv_slope"
    }

    fn name(&self) -> &'static str {
        "OBV Slope"
    }

    fn min_periods(&self) -> usize {
        self.lag + 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        self.from_obv(&Obv.compute(candles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles(closes: &[f64], volumes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&c, &v))| Candle::new(i as i64, c, c, c, c, v))
            .collect()
    }

    #[test]
    fn test_obv_starts_at_zero() {
        let obv = Obv.compute(&candles(&[10.0], &[500.0]));
        assert_eq!(obv, vec![0.0]);
    }

    #[test]
    fn test_obv_signs_and_ties() {
        let obv = Obv.compute(&candles(&[10.0, 11.0, 11.0, 9.0], &[1.0, 5.0, 7.0, 3.0]));
        assert_eq!(obv, vec![0.0, 5.0, 5.0, 2.0]);
    }

    #[test]
    fn test_obv_slope_lag() {
        let closes: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let slope = ObvSlope::default().compute(&candles(&closes, &[100.0; 10]));
        assert!(slope[..6].iter().all(|v| v.is_nan()));
        // six up bars of 100 each
        assert_eq!(slope[6], 600.0);
        assert_eq!(slope[9], 600.0);
    }

    #[test]
    fn test_obv_slope_min_periods() {
        assert_eq!(ObvSlope::new(6).min_periods(), 7);
    }
}
