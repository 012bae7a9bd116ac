//! Signal classification: latest indicator row -> tri-state signals -> verdict.
//!
//! Every threshold lives in [`RuleSet`], so dashboard variants become
//! configuration rather than code.

use crate::error::ConfigError;
use crate::types::{
    Direction, EntryPlan, IndicatorRow, LongTermSignal, PositionAction, PositionReview,
    ScoreResult, SignalSet, SignalState, Trend, Verdict,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds for the four readiness signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessRules {
    /// Long: RSI below this is oversold.
    pub rsi_long_below: f64,
    /// Short: RSI above this is overbought.
    pub rsi_short_above: f64,
}

impl Default for ReadinessRules {
    fn default() -> Self {
        Self {
            rsi_long_below: 35.0,
            rsi_short_above: 70.0,
        }
    }
}

/// Score cut-points for the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictCutpoints {
    pub strong_min: usize,
    pub watchlist_min: usize,
}

impl Default for VerdictCutpoints {
    fn default() -> Self {
        Self {
            strong_min: 4,
            watchlist_min: 3,
        }
    }
}

/// Swing entry signal and price targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryRules {
    pub rsi_min: f64,
    pub rsi_max: f64,
    pub entry_buffer_pct: f64,
    pub profit_target_pct: f64,
    pub stop_loss_pct: f64,
}

impl Default for EntryRules {
    fn default() -> Self {
        Self {
            rsi_min: 30.0,
            rsi_max: 40.0,
            entry_buffer_pct: 0.005,
            profit_target_pct: 0.10,
            stop_loss_pct: 0.05,
        }
    }
}

/// Long-term holding signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongTermRules {
    /// Early entry tolerates SMA50 down to this fraction of SMA200.
    pub early_sma_ratio: f64,
}

impl Default for LongTermRules {
    fn default() -> Self {
        Self {
            early_sma_ratio: 0.9,
        }
    }
}

/// Exit checks for an open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionRules {
    pub rsi_overbought: f64,
    pub sell_min: usize,
    pub watch_min: usize,
}

impl Default for PositionRules {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            sell_min: 3,
            watch_min: 2,
        }
    }
}

/// Complete threshold table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub readiness: ReadinessRules,
    pub verdict: VerdictCutpoints,
    pub entry: EntryRules,
    pub long_term: LongTermRules,
    pub position: PositionRules,
}

impl RuleSet {
    /// Load a rule set from JSON; missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Stateless classifier over a single indicator row.
#[derive(Debug, Clone, Default)]
pub struct SignalClassifier {
    rules: RuleSet,
}

impl SignalClassifier {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate the four readiness signals for a direction.
    pub fn classify(&self, row: &IndicatorRow, direction: Direction) -> SignalSet {
        let r = &self.rules.readiness;
        match direction {
            Direction::Long => SignalSet {
                direction,
                rsi: SignalState::lt(row.rsi, r.rsi_long_below),
                macd: SignalState::gt(row.macd, row.macd_signal),
                vwap: SignalState::gt(row.close, row.vwap),
                trend: SignalState::all([
                    SignalState::gt(row.close, row.sma_mid),
                    SignalState::gt(row.sma_mid, row.sma_long),
                ]),
            },
            Direction::Short => SignalSet {
                direction,
                rsi: SignalState::gt(row.rsi, r.rsi_short_above),
                macd: SignalState::lt(row.macd, row.macd_signal),
                vwap: SignalState::lt(row.close, row.vwap),
                trend: SignalState::all([
                    SignalState::lt(row.close, row.sma_mid),
                    SignalState::lt(row.sma_mid, row.sma_long),
                ]),
            },
        }
    }

    /// Count true signals and map the count to a verdict.
    ///
    /// Unknown signals vote neither way.
    pub fn score(&self, signals: &SignalSet) -> ScoreResult {
        let score = signals.count(SignalState::True);
        let unknown = signals.count(SignalState::Unknown);
        let cut = &self.rules.verdict;

        let verdict = if score >= cut.strong_min {
            Verdict::Strong
        } else if score >= cut.watchlist_min {
            Verdict::Watchlist
        } else {
            Verdict::Skip
        };

        ScoreResult {
            score,
            unknown,
            total: signals.iter().count(),
            verdict,
        }
    }

    /// Price trend from the close / SMA stack.
    pub fn trend(&self, row: &IndicatorRow) -> Trend {
        if row.close.is_nan() || row.sma_mid.is_nan() || row.sma_long.is_nan() {
            Trend::Unknown
        } else if row.close > row.sma_mid && row.sma_mid > row.sma_long {
            Trend::Bullish
        } else if row.close < row.sma_mid && row.sma_mid < row.sma_long {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }

    /// Long-term holding signal; `Unknown` when undefined inputs leave it open.
    pub fn long_term(&self, row: &IndicatorRow) -> LongTermSignal {
        let buy_and_hold = SignalState::all([
            SignalState::gt(row.close, row.sma_long),
            SignalState::gt(row.sma_mid, row.sma_long),
            SignalState::gt(row.obv, row.obv_sma_long),
        ]);
        let early_entry = SignalState::all([
            SignalState::gt(row.close, row.sma_mid),
            SignalState::gt(row.sma_mid, row.sma_long * self.rules.long_term.early_sma_ratio),
            SignalState::gt(row.obv, row.obv_sma_short),
        ]);

        match (buy_and_hold, early_entry) {
            (SignalState::True, _) => LongTermSignal::BuyAndHold,
            (SignalState::Unknown, _) => LongTermSignal::Unknown,
            (SignalState::False, SignalState::True) => LongTermSignal::EarlyEntry,
            (SignalState::False, SignalState::Unknown) => LongTermSignal::Unknown,
            (SignalState::False, SignalState::False) => LongTermSignal::Wait,
        }
    }

    /// Pullback entry: RSI in the entry band, MACD above signal, close
    /// between the fast and slow EMA, volume above its short average.
    pub fn entry_signal(&self, row: &IndicatorRow) -> SignalState {
        let e = &self.rules.entry;
        SignalState::all([
            SignalState::gt(row.rsi, e.rsi_min),
            SignalState::lt(row.rsi, e.rsi_max),
            SignalState::gt(row.macd, row.macd_signal),
            SignalState::gt(row.close, row.ema_fast),
            SignalState::lt(row.close, row.ema_slow),
            SignalState::gt(row.volume, row.volume_sma_short),
        ])
    }

    /// Entry, target and stop levels anchored on the bar high.
    pub fn entry_plan(&self, row: &IndicatorRow) -> EntryPlan {
        let e = &self.rules.entry;
        let entry = row.high * (1.0 + e.entry_buffer_pct);
        EntryPlan {
            entry,
            target: entry * (1.0 + e.profit_target_pct),
            stop: entry * (1.0 - e.stop_loss_pct),
        }
    }

    /// Exit checks for a long position bought at `buy_price`.
    pub fn review_position(&self, ticker: &str, row: &IndicatorRow, buy_price: f64) -> PositionReview {
        let p = &self.rules.position;
        let rsi_overbought = SignalState::gt(row.rsi, p.rsi_overbought);
        let macd_negative = SignalState::lt(row.macd_histogram, 0.0);
        let below_vwap = SignalState::lt(row.close, row.vwap);
        let volume_drop = SignalState::lt(row.volume, row.volume_sma_long);

        let score = [rsi_overbought, macd_negative, below_vwap, volume_drop]
            .iter()
            .filter(|s| s.is_true())
            .count();
        let action = if score >= p.sell_min {
            PositionAction::Sell
        } else if score >= p.watch_min {
            PositionAction::WatchClosely
        } else {
            PositionAction::Hold
        };

        PositionReview {
            ticker: ticker.to_string(),
            current_price: row.close,
            buy_price,
            unrealized_pl: row.close - buy_price,
            rsi_overbought,
            macd_negative,
            below_vwap,
            volume_drop,
            score,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullish_row() -> IndicatorRow {
        IndicatorRow {
            rsi: 20.0,
            macd: 1.5,
            macd_signal: 1.0,
            vwap: 95.0,
            sma_mid: 98.0,
            sma_long: 90.0,
            ..IndicatorRow::undefined(0, 100.0)
        }
    }

    #[test]
    fn test_long_all_true_is_strong_buy() {
        let classifier = SignalClassifier::default();
        let signals = classifier.classify(&bullish_row(), Direction::Long);
        assert_eq!(signals.count(SignalState::True), 4);

        let score = classifier.score(&signals);
        assert_eq!(score.score, 4);
        assert_eq!(score.verdict, Verdict::Strong);
        assert_eq!(score.verdict.label(Direction::Long), "Strong Buy");
        assert!(score.is_complete());
    }

    #[test]
    fn test_three_of_four_is_watchlist() {
        let row = IndicatorRow {
            rsi: 50.0,
            ..bullish_row()
        };
        let classifier = SignalClassifier::default();
        let score = classifier.score(&classifier.classify(&row, Direction::Long));
        assert_eq!(score.score, 3);
        assert_eq!(score.verdict, Verdict::Watchlist);
    }

    #[test]
    fn test_undefined_inputs_are_unknown_not_false() {
        let row = IndicatorRow::undefined(0, 100.0);
        let classifier = SignalClassifier::default();
        let signals = classifier.classify(&row, Direction::Long);
        assert!(signals.iter().all(|(_, s)| s == SignalState::Unknown));

        let score = classifier.score(&signals);
        assert_eq!(score.score, 0);
        assert_eq!(score.unknown, 4);
        assert_eq!(score.verdict, Verdict::Skip);
    }

    #[test]
    fn test_trend_unknown_without_sma200() {
        let row = IndicatorRow {
            sma_long: f64::NAN,
            ..bullish_row()
        };
        let classifier = SignalClassifier::default();
        let signals = classifier.classify(&row, Direction::Long);
        assert_eq!(signals.trend, SignalState::Unknown);
        assert_eq!(classifier.trend(&row), Trend::Unknown);
    }

    #[test]
    fn test_custom_cutpoints() {
        let rules = RuleSet {
            verdict: VerdictCutpoints {
                strong_min: 3,
                watchlist_min: 2,
            },
            ..RuleSet::default()
        };
        let row = IndicatorRow {
            rsi: 50.0,
            ..bullish_row()
        };
        let classifier = SignalClassifier::new(rules);
        let score = classifier.score(&classifier.classify(&row, Direction::Long));
        assert_eq!(score.verdict, Verdict::Strong);
    }

    #[test]
    fn test_long_term_signal_table() {
        let classifier = SignalClassifier::default();
        let base = IndicatorRow {
            obv: 500.0,
            obv_sma_short: 400.0,
            obv_sma_long: 450.0,
            ..bullish_row()
        };
        assert_eq!(classifier.long_term(&base), LongTermSignal::BuyAndHold);

        let early = IndicatorRow {
            sma_mid: 85.0,
            ..base
        };
        assert_eq!(classifier.long_term(&early), LongTermSignal::EarlyEntry);

        let wait = IndicatorRow {
            close: 80.0,
            ..base
        };
        assert_eq!(classifier.long_term(&wait), LongTermSignal::Wait);

        let unknown = IndicatorRow {
            obv_sma_long: f64::NAN,
            ..base
        };
        assert_eq!(classifier.long_term(&unknown), LongTermSignal::Unknown);
    }

    #[test]
    fn test_entry_signal_and_plan() {
        let row = IndicatorRow {
            high: 101.0,
            rsi: 35.0,
            ema_fast: 99.0,
            ema_slow: 102.0,
            volume: 2000.0,
            volume_sma_short: 1500.0,
            ..bullish_row()
        };
        let classifier = SignalClassifier::default();
        assert_eq!(classifier.entry_signal(&row), SignalState::True);

        let plan = classifier.entry_plan(&row);
        assert!((plan.entry - 101.505).abs() < 1e-9);
        assert!((plan.target - 101.505 * 1.10).abs() < 1e-9);
        assert!((plan.stop - 101.505 * 0.95).abs() < 1e-9);

        let no_volume = IndicatorRow {
            volume_sma_short: f64::NAN,
            ..row
        };
        assert_eq!(classifier.entry_signal(&no_volume), SignalState::Unknown);
    }

    #[test]
    fn test_review_position() {
        let row = IndicatorRow {
            rsi: 75.0,
            macd_histogram: -0.2,
            vwap: 105.0,
            volume: 100.0,
            volume_sma_long: 500.0,
            ..IndicatorRow::undefined(0, 100.0)
        };
        let review = SignalClassifier::default().review_position("AAPL", &row, 90.0);
        assert_eq!(review.score, 4);
        assert_eq!(review.action, PositionAction::Sell);
        assert_eq!(review.unrealized_pl, 10.0);

        let calm = IndicatorRow {
            rsi: 50.0,
            macd_histogram: 0.3,
            vwap: 95.0,
            ..row
        };
        let review = SignalClassifier::default().review_position("AAPL", &calm, 90.0);
        assert_eq!(review.score, 1);
        assert_eq!(review.action, PositionAction::Hold);
    }

    #[test]
    fn test_rule_set_partial_json() {
        let rules: RuleSet =
            serde_json::from_str(r#"{"readiness": {"rsi_long_below": 30.0}}"#).unwrap();
        assert_eq!(rules.readiness.rsi_long_below, 30.0);
        assert_eq!(rules.readiness.rsi_short_above, 70.0);
        assert_eq!(rules.verdict.strong_min, 4);
    }
}
