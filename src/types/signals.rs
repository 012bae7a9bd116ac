use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trade direction the signals are evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Bullish setups ("CALL").
    #[default]
    Long,
    /// Bearish setups ("PUT"), every rule mirrored.
    Short,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "call" | "buy" => Ok(Direction::Long),
            "short" | "put" | "sell" => Ok(Direction::Short),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// Tri-state outcome of a single rule.
///
/// `Unknown` means an input was undefined; it is never coerced to `False`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    True,
    False,
    Unknown,
}

impl SignalState {
    pub fn from_bool(value: bool) -> Self {
        if value {
            SignalState::True
        } else {
            SignalState::False
        }
    }

    /// `a > b`, unknown if either side is NaN.
    pub fn gt(a: f64, b: f64) -> Self {
        if a.is_nan() || b.is_nan() {
            SignalState::Unknown
        } else {
            Self::from_bool(a > b)
        }
    }

    /// `a < b`, unknown if either side is NaN.
    pub fn lt(a: f64, b: f64) -> Self {
        Self::gt(b, a)
    }

    /// Conjunction that propagates undefined inputs: any `Unknown` makes the
    /// whole result `Unknown`, otherwise any `False` makes it `False`.
    pub fn all<I: IntoIterator<Item = SignalState>>(states: I) -> Self {
        let mut result = SignalState::True;
        for state in states {
            match state {
                SignalState::Unknown => return SignalState::Unknown,
                SignalState::False => result = SignalState::False,
                SignalState::True => {}
            }
        }
        result
    }

    pub fn is_true(&self) -> bool {
        matches!(self, SignalState::True)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SignalState::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalState::True => "true",
            SignalState::False => "false",
            SignalState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four readiness rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Rsi,
    Macd,
    Vwap,
    Trend,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Rsi,
        SignalKind::Macd,
        SignalKind::Vwap,
        SignalKind::Trend,
    ];

    /// Column label for the given direction.
    pub fn label(&self, direction: Direction) -> &'static str {
        match (self, direction) {
            (SignalKind::Rsi, Direction::Long) => "RSI oversold",
            (SignalKind::Rsi, Direction::Short) => "RSI overbought",
            (SignalKind::Macd, Direction::Long) => "MACD > signal",
            (SignalKind::Macd, Direction::Short) => "MACD < signal",
            (SignalKind::Vwap, Direction::Long) => "Above VWAP",
            (SignalKind::Vwap, Direction::Short) => "Below VWAP",
            (SignalKind::Trend, Direction::Long) => "SMA uptrend",
            (SignalKind::Trend, Direction::Short) => "SMA downtrend",
        }
    }
}

/// Signal states keyed by rule, in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    pub direction: Direction,
    pub rsi: SignalState,
    pub macd: SignalState,
    pub vwap: SignalState,
    pub trend: SignalState,
}

impl SignalSet {
    pub fn get(&self, kind: SignalKind) -> SignalState {
        match kind {
            SignalKind::Rsi => self.rsi,
            SignalKind::Macd => self.macd,
            SignalKind::Vwap => self.vwap,
            SignalKind::Trend => self.trend,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SignalKind, SignalState)> + '_ {
        SignalKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    pub fn count(&self, state: SignalState) -> usize {
        self.iter().filter(|(_, s)| *s == state).count()
    }
}

/// Categorical readiness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Strong,
    Watchlist,
    Skip,
}

impl Verdict {
    pub fn label(&self, direction: Direction) -> &'static str {
        match (self, direction) {
            (Verdict::Strong, Direction::Long) => "Strong Buy",
            (Verdict::Strong, Direction::Short) => "Strong Sell",
            (Verdict::Watchlist, _) => "Watchlist",
            (Verdict::Skip, _) => "Skip",
        }
    }
}

/// Aggregated score for one signal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Number of rules that are `True`.
    pub score: usize,
    /// Number of rules that could not be evaluated.
    pub unknown: usize,
    /// Number of rules evaluated.
    pub total: usize,
    pub verdict: Verdict,
}

impl ScoreResult {
    /// Every rule had defined inputs.
    pub fn is_complete(&self) -> bool {
        self.unknown == 0
    }
}

/// Price trend from the close / SMA50 / SMA200 stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
    Unknown,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Bullish => "Bullish",
            Trend::Bearish => "Bearish",
            Trend::Neutral => "Neutral",
            Trend::Unknown => "Unknown",
        }
    }
}

/// Volume-flow sentiment from the OBV slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Accumulating,
    Distributing,
    Neutral,
    Unknown,
}

impl Sentiment {
    pub fn from_slope(slope: f64) -> Self {
        if slope.is_nan() {
            Sentiment::Unknown
        } else if slope > 0.0 {
            Sentiment::Accumulating
        } else if slope < 0.0 {
            Sentiment::Distributing
        } else {
            Sentiment::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Accumulating => "Accumulating",
            Sentiment::Distributing => "Distributing",
            Sentiment::Neutral => "Neutral",
            Sentiment::Unknown => "Unknown",
        }
    }
}

/// Multi-interval signal strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Perfect,
    Strong,
    Weak,
    Neutral,
}

impl Strength {
    pub fn label(&self) -> &'static str {
        match self {
            Strength::Perfect => "Perfect",
            Strength::Strong => "Strong",
            Strength::Weak => "Weak",
            Strength::Neutral => "Neutral",
        }
    }
}

/// Long-horizon holding signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongTermSignal {
    BuyAndHold,
    EarlyEntry,
    Wait,
    Unknown,
}

impl LongTermSignal {
    pub fn label(&self) -> &'static str {
        match self {
            LongTermSignal::BuyAndHold => "Buy & Hold",
            LongTermSignal::EarlyEntry => "Early Entry",
            LongTermSignal::Wait => "Wait",
            LongTermSignal::Unknown => "Unknown",
        }
    }
}

/// Price levels for a swing entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPlan {
    pub entry: f64,
    pub target: f64,
    pub stop: f64,
}

/// Recommended action for an open long position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionAction {
    Sell,
    WatchClosely,
    Hold,
}

impl PositionAction {
    pub fn label(&self) -> &'static str {
        match self {
            PositionAction::Sell => "Time to Sell",
            PositionAction::WatchClosely => "Watch Closely",
            PositionAction::Hold => "Hold",
        }
    }
}

/// Exit-signal check for a held position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionReview {
    pub ticker: String,
    pub current_price: f64,
    pub buy_price: f64,
    pub unrealized_pl: f64,
    pub rsi_overbought: SignalState,
    pub macd_negative: SignalState,
    pub below_vwap: SignalState,
    pub volume_drop: SignalState,
    pub score: usize,
    pub action: PositionAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse_aliases() {
        assert_eq!("CALL".parse::<Direction>(), Ok(Direction::Long));
        assert_eq!("put".parse::<Direction>(), Ok(Direction::Short));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_signal_state_comparisons_with_nan() {
        assert_eq!(SignalState::gt(2.0, 1.0), SignalState::True);
        assert_eq!(SignalState::lt(2.0, 1.0), SignalState::False);
        assert_eq!(SignalState::gt(f64::NAN, 1.0), SignalState::Unknown);
        assert_eq!(SignalState::lt(1.0, f64::NAN), SignalState::Unknown);
    }

    #[test]
    fn test_signal_state_all() {
        use SignalState::*;
        assert_eq!(SignalState::all([True, True]), True);
        assert_eq!(SignalState::all([True, Unknown]), Unknown);
        assert_eq!(SignalState::all([Unknown, False]), Unknown);
        assert_eq!(SignalState::all([True, False]), False);
        assert_eq!(SignalState::all([]), True);
    }

    #[test]
    fn test_sentiment_from_slope() {
        assert_eq!(Sentiment::from_slope(10.0), Sentiment::Accumulating);
        assert_eq!(Sentiment::from_slope(-1.0), Sentiment::Distributing);
        assert_eq!(Sentiment::from_slope(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_slope(f64::NAN), Sentiment::Unknown);
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(Verdict::Strong.label(Direction::Long), "Strong Buy");
        assert_eq!(Verdict::Strong.label(Direction::Short), "Strong Sell");
        assert_eq!(Verdict::Skip.label(Direction::Short), "Skip");
    }

    #[test]
    fn test_signal_state_serialization() {
        let json = serde_json::to_string(&SignalState::Unknown).unwrap();
        assert_eq!(json, "\"unknown\"");
    }
}
