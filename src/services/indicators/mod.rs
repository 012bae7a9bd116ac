//! Technical indicator implementations.
//!
//! Each indicator produces a full rolling column aligned with the input
//! candles. Positions without enough history hold `f64::NAN`.

pub mod ema;
pub mod levels;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod vwap;

pub use ema::Ema;
pub use levels::SupportResistanceFinder;
pub use macd::{Macd, MacdLines};
pub use obv::{Obv, ObvSlope};
pub use rsi::{Rsi, RsiSmoothing};
pub use sma::Sma;
pub use vwap::Vwap;

use crate::types::Candle;

/// Trait for implementing technical indicators.
pub trait Indicator {
    type Output;

    /// Unique identifier for this indicator.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Number of candles required before the latest value is defined.
    fn min_periods(&self) -> usize;

    /// Compute the indicator over the candles.
    fn compute(&self, candles: &[Candle]) -> Self::Output;
}

/// Exponential smoothing with `α = 2/(span+1)`, seeded with the first
/// finite value. Leading NaNs stay NaN.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &x in values {
        let next = match prev {
            None if x.is_nan() => f64::NAN,
            None => x,
            Some(p) if x.is_nan() => p,
            Some(p) => p + alpha * (x - p),
        };
        if !next.is_nan() {
            prev = Some(next);
        }
        out.push(next);
    }
    out
}

/// Rolling mean over `window` values; NaN until the window is full or
/// while it contains a NaN.
pub fn sma_series(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for end in window..=values.len() {
        let slice = &values[end - window..end];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[end - 1] = slice.iter().sum::<f64>() / window as f64;
    }
    out
}

/// Replace the first `count` entries with NaN.
pub fn mask_leading(values: &mut [f64], count: usize) {
    for v in values.iter_mut().take(count) {
        *v = f64::NAN;
    }
}

/// `values[t] - values[t - lag]`, NaN where undefined.
pub fn lagged_difference(values: &[f64], lag: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(t, v)| match t.checked_sub(lag) {
            Some(prev) if lag > 0 => v - values[prev],
            _ => f64::NAN,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::Candle;

    /// Candles with the given closes, a fixed spread and constant volume.
    pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(1_000_000 + i as i64 * 60_000, c, c + 1.0, c - 1.0, c, 1000.0))
            .collect()
    }
}
