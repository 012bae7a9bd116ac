//! Report rendering: aligned text tables, CSV and JSON.

use crate::error::AppError;
use crate::services::scanner::{ScanReport, SkippedTicker, StrengthReport};
use crate::types::{PositionReview, SignalKind};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Fixed-precision number; NaN renders as `blank`.
fn num(value: f64, blank: &str) -> String {
    if value.is_nan() {
        blank.to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Quote a CSV field when it contains a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_csv_record<W: Write>(out: &mut W, fields: &[String]) -> std::io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
    writeln!(out, "{}", line.join(","))
}

/// Render rows as a left-aligned text table.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let render = |out: &mut String, cells: Vec<&str>| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = w))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    };
    render(&mut out, headers.to_vec());
    render(
        &mut out,
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().iter().map(String::as_str).collect(),
    );
    for row in rows {
        render(&mut out, row.iter().map(String::as_str).collect());
    }
    out
}

fn skipped_summary(skipped: &[SkippedTicker]) -> String {
    let mut out = String::new();
    if skipped.is_empty() {
        return out;
    }
    let _ = writeln!(out, "\nSkipped {} ticker(s):", skipped.len());
    for s in skipped {
        let _ = writeln!(out, "  {} [{}] {}", s.ticker, s.interval, s.reason);
    }
    out
}

// =============================================================================
// Scan
// =============================================================================

const SCAN_HEADERS: &[&str] = &[
    "ticker", "interval", "direction", "verdict", "score", "unknown", "close", "rsi", "macd",
    "macd_signal", "vwap", "sma50", "sma200", "obv_slope", "support", "resistance", "rsi_ok",
    "macd_ok", "vwap_ok", "trend_ok", "trend", "sentiment", "long_term", "entry_signal",
    "entry", "target", "stop", "status", "reason",
];

fn scan_records(report: &ScanReport, blank: &str) -> Vec<Vec<String>> {
    report
        .rows
        .iter()
        .map(|r| {
            let mut fields = vec![
                r.ticker.clone(),
                r.interval.to_string(),
                r.direction.to_string(),
                r.verdict_label().to_string(),
                r.score.score.to_string(),
                r.score.unknown.to_string(),
                num(r.row.close, blank),
                num(r.row.rsi, blank),
                num(r.row.macd, blank),
                num(r.row.macd_signal, blank),
                num(r.row.vwap, blank),
                num(r.row.sma_mid, blank),
                num(r.row.sma_long, blank),
                num(r.row.obv_slope, blank),
                num(r.row.support, blank),
                num(r.row.resistance, blank),
            ];
            fields.extend(SignalKind::ALL.iter().map(|&k| r.signals.get(k).to_string()));
            fields.extend([
                r.trend.label().to_string(),
                r.sentiment.label().to_string(),
                r.long_term.label().to_string(),
                r.entry_signal.to_string(),
                num(r.entry_plan.entry, blank),
                num(r.entry_plan.target, blank),
                num(r.entry_plan.stop, blank),
            ]);
            fields
        })
        .collect()
}

pub fn render_scan_table(report: &ScanReport) -> String {
    let headers = [
        "Ticker", "Verdict", "Score", "Close", "RSI", "MACD", "Signal", "VWAP", "SMA50", "SMA200",
        "Trend", "Volume",
    ];
    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|r| {
            vec![
                r.ticker.clone(),
                r.verdict_label().to_string(),
                format!("{}/{}", r.score.score, r.score.total),
                num(r.row.close, "-"),
                num(r.row.rsi, "-"),
                num(r.row.macd, "-"),
                num(r.row.macd_signal, "-"),
                num(r.row.vwap, "-"),
                num(r.row.sma_mid, "-"),
                num(r.row.sma_long, "-"),
                r.trend.label().to_string(),
                r.sentiment.label().to_string(),
            ]
        })
        .collect();

    let mut out = format!(
        "{} scan, {} interval: {} result(s)\n\n",
        report.direction, report.interval, report.rows.len()
    );
    out.push_str(&table(&headers, &rows));
    out.push_str(&skipped_summary(&report.skipped));
    out
}

/// CSV with one record per ticker. NaN is an empty cell; skipped tickers
/// follow the scored rows with only `status` and `reason` filled in.
pub fn write_scan_csv<W: Write>(out: &mut W, report: &ScanReport) -> std::io::Result<()> {
    let headers: Vec<String> = SCAN_HEADERS.iter().map(|h| h.to_string()).collect();
    write_csv_record(out, &headers)?;
    for mut record in scan_records(report, "") {
        record.extend(["ok".to_string(), String::new()]);
        write_csv_record(out, &record)?;
    }
    for s in &report.skipped {
        let mut record = vec![String::new(); SCAN_HEADERS.len()];
        record[0] = s.ticker.clone();
        record[1] = s.interval.to_string();
        record[2] = report.direction.to_string();
        record[SCAN_HEADERS.len() - 2] = "skipped".to_string();
        record[SCAN_HEADERS.len() - 1] = s.reason.clone();
        write_csv_record(out, &record)?;
    }
    Ok(())
}

// =============================================================================
// Strength
// =============================================================================

pub fn render_strength_table(report: &StrengthReport) -> String {
    let mut headers = vec!["Ticker".to_string()];
    for interval in &report.intervals {
        headers.push(format!("{} trend", interval));
        headers.push(format!("{} volume", interval));
    }
    headers.push("Strength".to_string());

    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|r| {
            let mut cells = vec![r.ticker.clone()];
            for reading in &r.readings {
                cells.push(reading.trend.label().to_string());
                cells.push(reading.sentiment.label().to_string());
            }
            cells.push(r.strength.label().to_string());
            cells
        })
        .collect();

    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    let mut out = table(&header_refs, &rows);
    out.push_str(&skipped_summary(&report.skipped));
    out
}

pub fn write_strength_csv<W: Write>(out: &mut W, report: &StrengthReport) -> std::io::Result<()> {
    let mut headers = vec!["ticker".to_string()];
    for interval in &report.intervals {
        headers.push(format!("trend_{}", interval));
        headers.push(format!("sentiment_{}", interval));
    }
    headers.extend(["strength", "status", "reason"].map(String::from));
    write_csv_record(out, &headers)?;

    for r in &report.rows {
        let mut fields = vec![r.ticker.clone()];
        for reading in &r.readings {
            fields.push(reading.trend.label().to_string());
            fields.push(reading.sentiment.label().to_string());
        }
        fields.push(r.strength.label().to_string());

        let failures: Vec<String> = report
            .skipped
            .iter()
            .filter(|s| s.ticker == r.ticker)
            .map(|s| format!("{}: {}", s.interval, s.reason))
            .collect();
        let status = if failures.is_empty() { "ok" } else { "incomplete" };
        fields.push(status.to_string());
        fields.push(failures.join("; "));
        write_csv_record(out, &fields)?;
    }
    Ok(())
}

// =============================================================================
// Position review
// =============================================================================

pub fn render_review(review: &PositionReview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}: {}", review.ticker, review.action.label());
    let _ = writeln!(
        out,
        "  price {}  bought {}  P/L {}",
        num(review.current_price, "-"),
        num(review.buy_price, "-"),
        num(review.unrealized_pl, "-")
    );
    let checks = [
        ("RSI overbought", review.rsi_overbought),
        ("MACD histogram negative", review.macd_negative),
        ("Below VWAP", review.below_vwap),
        ("Volume drop", review.volume_drop),
    ];
    for (name, state) in checks {
        let _ = writeln!(out, "  {:<24} {}", name, state);
    }
    let _ = writeln!(out, "  exit score {}/4", review.score);
    out
}

pub fn write_review_csv<W: Write>(out: &mut W, review: &PositionReview) -> std::io::Result<()> {
    let headers = [
        "ticker", "current_price", "buy_price", "unrealized_pl", "rsi_overbought",
        "macd_negative", "below_vwap", "volume_drop", "score", "action",
    ];
    write_csv_record(out, &headers.map(String::from))?;
    write_csv_record(
        out,
        &[
            review.ticker.clone(),
            num(review.current_price, ""),
            num(review.buy_price, ""),
            num(review.unrealized_pl, ""),
            review.rsi_overbought.to_string(),
            review.macd_negative.to_string(),
            review.below_vwap.to_string(),
            review.volume_drop.to_string(),
            review.score.to_string(),
            review.action.label().to_string(),
        ],
    )
}

// =============================================================================
// Dispatch
// =============================================================================

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_scan<W: Write>(out: &mut W, format: OutputFormat, report: &ScanReport) -> Result<(), AppError> {
    match format {
        OutputFormat::Table => out.write_all(render_scan_table(report).as_bytes())?,
        OutputFormat::Csv => write_scan_csv(out, report)?,
        OutputFormat::Json => write_json(out, report)?,
    }
    Ok(())
}

pub fn write_strength<W: Write>(
    out: &mut W,
    format: OutputFormat,
    report: &StrengthReport,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Table => out.write_all(render_strength_table(report).as_bytes())?,
        OutputFormat::Csv => write_strength_csv(out, report)?,
        OutputFormat::Json => write_json(out, report)?,
    }
    Ok(())
}

pub fn write_review<W: Write>(
    out: &mut W,
    format: OutputFormat,
    review: &PositionReview,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Table => out.write_all(render_review(review).as_bytes())?,
        OutputFormat::Csv => write_review_csv(out, review)?,
        OutputFormat::Json => write_json(out, review)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkipKind;
    use crate::services::scanner::StrengthRow;
    use crate::services::strength::IntervalReading;
    use crate::types::{
        Direction, Interval, PositionAction, Sentiment, SignalState, Strength, Trend,
    };

    fn review() -> PositionReview {
        PositionReview {
            ticker: "AAPL".to_string(),
            current_price: 110.0,
            buy_price: 100.0,
            unrealized_pl: 10.0,
            rsi_overbought: SignalState::True,
            macd_negative: SignalState::Unknown,
            below_vwap: SignalState::False,
            volume_drop: SignalState::True,
            score: 2,
            action: PositionAction::WatchClosely,
        }
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_nan_renders_blank() {
        assert_eq!(num(f64::NAN, ""), "");
        assert_eq!(num(f64::NAN, "-"), "-");
        assert_eq!(num(1.0 / 3.0, ""), "0.33");
    }

    #[test]
    fn test_review_csv() {
        let mut buf = Vec::new();
        write_review_csv(&mut buf, &review()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "AAPL,110.00,100.00,10.00,true,unknown,false,true,2,Watch Closely"
        );
    }

    #[test]
    fn test_review_table_mentions_action() {
        let text = render_review(&review());
        assert!(text.starts_with("AAPL: Watch Closely"));
        assert!(text.contains("unknown"));
    }

    #[test]
    fn test_scan_csv_lists_skipped_tickers() {
        let report = ScanReport {
            interval: Interval::OneDay,
            direction: Direction::Long,
            rows: Vec::new(),
            skipped: vec![SkippedTicker {
                ticker: "ZZZZ".to_string(),
                interval: Interval::OneDay,
                kind: SkipKind::UnknownSymbol,
                reason: "unknown symbol: ZZZZ, try again".to_string(),
            }],
        };
        let mut buf = Vec::new();
        write_scan_csv(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(",status,reason"));
        assert!(lines[1].starts_with("ZZZZ,1d,"));
        assert!(lines[1].ends_with(",skipped,\"unknown symbol: ZZZZ, try again\""));
        assert_eq!(
            lines[1].matches(',').count(),
            lines[0].matches(',').count() + 1
        );
    }

    #[test]
    fn test_strength_csv_marks_incomplete_rows() {
        let report = StrengthReport {
            intervals: vec![Interval::OneHour, Interval::OneDay],
            rows: vec![StrengthRow {
                ticker: "MSFT".to_string(),
                readings: vec![
                    IntervalReading::unknown(Interval::OneHour),
                    IntervalReading::new(Interval::OneDay, Trend::Bullish, Sentiment::Accumulating),
                ],
                strength: Strength::Neutral,
                rule: None,
            }],
            skipped: vec![SkippedTicker {
                ticker: "MSFT".to_string(),
                interval: Interval::OneHour,
                kind: SkipKind::Unavailable,
                reason: "down".to_string(),
            }],
        };
        let mut buf = Vec::new();
        write_strength_csv(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with(",strength,status,reason"));
        assert!(lines[1].ends_with(",incomplete,1h: down"));
    }

    #[test]
    fn test_table_alignment() {
        let text = table(&["A", "Long"], &[vec!["xyz".to_string(), "1".to_string()]]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "A    Long");
        assert_eq!(lines[1], "---  ----");
        assert_eq!(lines[2], "xyz  1");
    }
}
