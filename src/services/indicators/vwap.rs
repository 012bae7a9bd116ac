//! Volume Weighted Average Price (VWAP) indicator.

use super::Indicator;
use crate::types::Candle;

/// Session-cumulative VWAP.
///
/// `VWAP_t = Σ(TP_i · V_i) / Σ V_i` accumulated from the first candle of the
/// fetched window, with `TP = (H + L + C) / 3`. The value therefore depends
/// on how much history was fetched. NaN while cumulative volume is zero.
#[derive(Default)]
pub struct Vwap;

impl Indicator for Vwap {
    type Output = Vec<f64>;

    fn id(&self) -> &'static str {
        "vwap"
    }

    fn name(&self) -> &'static str {
        "Volume Weighted Average Price"
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut cum_tp_vol = 0.0;
        let mut cum_vol = 0.0;

        candles
            .iter()
            .map(|candle| {
                cum_tp_vol += candle.typical_price() * candle.volume;
                cum_vol += candle.volume;
                if cum_vol > 0.0 {
                    cum_tp_vol / cum_vol
                } else {
                    f64::NAN
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vwap_id() {
        assert_eq!(Vwap.id(), "vwap");
    }

    #[test]
    fn test_vwap_first_value_is_typical_price() {
        let candles = vec![Candle::new(0, 10.0, 12.0, 9.0, 11.0, 100.0)];
        let vwap = Vwap.compute(&candles);
        assert!((vwap[0] - 32.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_vwap_zero_volume_is_undefined() {
        let candles = vec![
            Candle::new(0, 10.0, 12.0, 9.0, 11.0, 0.0),
            Candle::new(1, 11.0, 13.0, 10.0, 12.0, 50.0),
        ];
        let vwap = Vwap.compute(&candles);
        assert!(vwap[0].is_nan());
        assert!((vwap[1] - 35.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_vwap_weights_by_volume() {
        let candles = vec![
            Candle::new(0, 10.0, 10.0, 10.0, 10.0, 300.0),
            Candle::new(1, 20.0, 20.0, 20.0, 20.0, 100.0),
        ];
        let vwap = Vwap.compute(&candles);
        assert!((vwap[1] - 12.5).abs() < 1e-12);
    }
}
