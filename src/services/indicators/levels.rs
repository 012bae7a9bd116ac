//! Support / resistance from local extrema of close.

use super::Indicator;
use crate::types::{Candle, SupportResistance};

/// Finds support and resistance from local extrema.
///
/// A close is a local minimum when it is `<=` every close within `window`
/// bars on each side (maximum likewise with `>=`). Runs of adjacent equal
/// extrema count once. The estimate is the mean of the most recent
/// `max_points` extrema, or the global min / max when none qualify.
pub struct SupportResistanceFinder {
    window: usize,
    max_points: usize,
}

impl Default for SupportResistanceFinder {
    fn default() -> Self {
        Self {
            window: 10,
            max_points: 3,
        }
    }
}

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

impl SupportResistanceFinder {
    pub fn new(window: usize, max_points: usize) -> Self {
        Self {
            window: window.max(1),
            max_points: max_points.max(1),
        }
    }

    fn extrema(&self, closes: &[f64], kind: Extremum) -> Vec<f64> {
        let w = self.window;
        let mut found: Vec<(usize, f64)> = Vec::new();
        if closes.len() < 2 * w + 1 {
            return Vec::new();
        }

        for i in w..closes.len() - w {
            let v = closes[i];
            if v.is_nan() {
                continue;
            }
            let qualifies = (1..=w).all(|j| {
                let (left, right) = (closes[i - j], closes[i + j]);
                match kind {
                    Extremum::Min => v <= left && v <= right,
                    Extremum::Max => v >= left && v >= right,
                }
            });
            if !qualifies {
                continue;
            }
            match found.last() {
                Some(&(prev, prev_v)) if prev + 1 == i && prev_v == v => {}
                _ => found.push((i, v)),
            }
        }

        found.into_iter().map(|(_, v)| v).collect()
    }

    fn recent_mean(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let recent = &values[values.len().saturating_sub(self.max_points)..];
        Some(recent.iter().sum::<f64>() / recent.len() as f64)
    }

    /// Levels over a close column.
    pub fn from_closes(&self, closes: &[f64]) -> SupportResistance {
        let finite = closes.iter().copied().filter(|v| !v.is_nan());
        let (global_min, global_max) = finite.fold((f64::NAN, f64::NAN), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        let support = self
            .recent_mean(&self.extrema(closes, Extremum::Min))
            .unwrap_or(global_min);
        let resistance = self
            .recent_mean(&self.extrema(closes, Extremum::Max))
            .unwrap_or(global_max);

        SupportResistance {
            support,
            resistance,
        }
    }
}

impl Indicator for SupportResistanceFinder {
    type Output = SupportResistance;

    fn id(&self) -> &'static str {
        "support_resistance"
    }

    fn name(&self) -> &'static str {
        "Support / Resistance"
    }

    fn min_periods(&self) -> usize {
        2 * self.window + 1
    }

    fn compute(&self, candles: &[Candle]) -> SupportResistance {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        self.from_closes(&closes)
    }
}
