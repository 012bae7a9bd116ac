//! Multi-interval strength: an ordered decision table over per-interval
//! trend and volume sentiment. The first matching rule wins.

use crate::types::{IndicatorRow, Interval, Sentiment, Strength, Trend};
use serde::{Deserialize, Serialize};

/// Trend and sentiment observed on one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalReading {
    pub interval: Interval,
    pub trend: Trend,
    pub sentiment: Sentiment,
}

impl IntervalReading {
    pub fn new(interval: Interval, trend: Trend, sentiment: Sentiment) -> Self {
        Self {
            interval,
            trend,
            sentiment,
        }
    }

    /// Reading for an interval whose data could not be fetched or computed.
    pub fn unknown(interval: Interval) -> Self {
        Self::new(interval, Trend::Unknown, Sentiment::Unknown)
    }

    /// Sentiment from the latest OBV slope; trend supplied by the classifier.
    pub fn from_row(interval: Interval, trend: Trend, row: &IndicatorRow) -> Self {
        Self::new(interval, trend, Sentiment::from_slope(row.obv_slope))
    }

    fn bullish_accumulating(&self) -> bool {
        self.trend == Trend::Bullish && self.sentiment == Sentiment::Accumulating
    }
}

/// One row of the decision table.
pub struct StrengthRule {
    pub name: &'static str,
    pub matches: fn(&[IntervalReading]) -> bool,
    pub strength: Strength,
}

fn all_bullish_accumulating(r: &[IntervalReading]) -> bool {
    r.iter().all(IntervalReading::bullish_accumulating)
}

fn two_or_more_bearish(r: &[IntervalReading]) -> bool {
    r.iter().filter(|x| x.trend == Trend::Bearish).count() >= 2
}

fn all_distributing(r: &[IntervalReading]) -> bool {
    r.iter().all(|x| x.sentiment == Sentiment::Distributing)
}

fn any_bearish_distributing(r: &[IntervalReading]) -> bool {
    r.iter()
        .any(|x| x.trend == Trend::Bearish && x.sentiment == Sentiment::Distributing)
}

fn constructive(r: &[IntervalReading]) -> bool {
    let trends_ok = r
        .iter()
        .all(|x| matches!(x.trend, Trend::Bullish | Trend::Neutral));
    let sentiments_ok = r
        .iter()
        .all(|x| matches!(x.sentiment, Sentiment::Accumulating | Sentiment::Distributing));
    let distributing = r
        .iter()
        .filter(|x| x.sentiment == Sentiment::Distributing)
        .count();

    trends_ok
        && sentiments_ok
        && r.iter().any(IntervalReading::bullish_accumulating)
        && distributing <= 1
}

pub static STRENGTH_RULES: &[StrengthRule] = &[
    StrengthRule {
        name: "all_bullish_accumulating",
        matches: all_bullish_accumulating,
        strength: Strength::Perfect,
    },
    StrengthRule {
        name: "two_or_more_bearish",
        matches: two_or_more_bearish,
        strength: Strength::Weak,
    },
    StrengthRule {
        name: "all_distributing",
        matches: all_distributing,
        strength: Strength::Weak,
    },
    StrengthRule {
        name: "bearish_and_distributing",
        matches: any_bearish_distributing,
        strength: Strength::Weak,
    },
    StrengthRule {
        name: "constructive",
        matches: constructive,
        strength: Strength::Strong,
    },
];

/// Classify a set of interval readings.
///
/// Returns the matching rule name alongside the strength; `None` means no
/// rule fired and the result is `Neutral`. An empty reading set is `Neutral`.
pub fn classify_strength_with_rule(
    readings: &[IntervalReading],
) -> (Strength, Option<&'static str>) {
    if readings.is_empty() {
        return (Strength::Neutral, None);
    }
    STRENGTH_RULES
        .iter()
        .find(|rule| (rule.matches)(readings))
        .map(|rule| (rule.strength, Some(rule.name)))
        .unwrap_or((Strength::Neutral, None))
}

pub fn classify_strength(readings: &[IntervalReading]) -> Strength {
    classify_strength_with_rule(readings).0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(pairs: &[(Trend, Sentiment)]) -> Vec<IntervalReading> {
        let intervals = [Interval::FifteenMinutes, Interval::OneHour, Interval::OneDay];
        pairs
            .iter()
            .zip(intervals)
            .map(|(&(t, s), i)| IntervalReading::new(i, t, s))
            .collect()
    }

    use Sentiment::{Accumulating as Acc, Distributing as Dist};
    use Trend::{Bearish, Bullish, Neutral};

    #[test]
    fn test_perfect() {
        let r = readings(&[(Bullish, Acc), (Bullish, Acc), (Bullish, Acc)]);
        assert_eq!(classify_strength(&r), Strength::Perfect);
    }

    #[test]
    fn test_two_bearish_is_weak() {
        let r = readings(&[(Bearish, Acc), (Bearish, Acc), (Bullish, Acc)]);
        assert_eq!(
            classify_strength_with_rule(&r),
            (Strength::Weak, Some("two_or_more_bearish"))
        );
    }

    #[test]
    fn test_all_distributing_is_weak() {
        let r = readings(&[(Bullish, Dist), (Neutral, Dist), (Bullish, Dist)]);
        assert_eq!(classify_strength(&r), Strength::Weak);
    }

    #[test]
    fn test_single_bearish_distributing_is_weak() {
        let r = readings(&[(Bearish, Dist), (Bullish, Acc), (Bullish, Acc)]);
        assert_eq!(
            classify_strength_with_rule(&r),
            (Strength::Weak, Some("bearish_and_distributing"))
        );
    }

    #[test]
    fn test_strong() {
        let r = readings(&[(Bullish, Acc), (Neutral, Dist), (Neutral, Acc)]);
        assert_eq!(classify_strength(&r), Strength::Strong);
    }

    #[test]
    fn test_two_distributing_is_neutral() {
        let r = readings(&[(Bullish, Acc), (Neutral, Dist), (Bullish, Dist)]);
        assert_eq!(classify_strength(&r), Strength::Neutral);
    }

    #[test]
    fn test_unknown_reading_blocks_strong() {
        let mut r = readings(&[(Bullish, Acc), (Bullish, Acc)]);
        r.push(IntervalReading::unknown(Interval::OneDay));
        assert_eq!(classify_strength(&r), Strength::Neutral);
    }

    #[test]
    fn test_empty_is_neutral() {
        assert_eq!(classify_strength(&[]), Strength::Neutral);
    }
}
