//! Exponential Moving Average (EMA) indicator.

use super::{ema_series, mask_leading, Indicator};
use crate::types::Candle;

/// EMA of close.
///
/// Uses the plain recurrence `EMA_t = EMA_{t-1} + α(x_t − EMA_{t-1})` with
/// `α = 2/(span+1)`, seeded from the first close. Values before `span`
/// closes are available are reported as NaN.
pub struct Ema {
    span: usize,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self { span: span.max(1) }
    }
}

impl Indicator for Ema {
    type Output = Vec<f64>;

    fn id(&self) -> &'static str {
        "ema"
    }

    fn name(&self) -> &'static str {
        "Exponential Moving Average"
    }

    fn min_periods(&self) -> usize {
        self.span
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let mut ema = ema_series(&closes, self.span);
        mask_leading(&mut ema, self.span - 1);
        ema
    }
}
