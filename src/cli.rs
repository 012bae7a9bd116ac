use crate::error::{AppError, Result};
use crate::services::export::{write_review, write_scan, write_strength};
use crate::services::{OutputFormat, Scanner};
use crate::sources::{normalize_tickers, FileUniverse, TickerUniverse};
use crate::types::{Direction, Interval};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(author, version, about = "Technical indicator scanner for US equities", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the tickers come from.
#[derive(Debug, Args)]
pub struct TickerArgs {
    /// Tickers, space or comma separated (e.g. "AAPL,MSFT")
    #[arg(value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// File of tickers, one per line or comma separated
    #[arg(long)]
    pub universe_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score tickers on the four readiness signals
    Scan {
        #[command(flatten)]
        tickers: TickerArgs,

        /// Bar interval: 1m, 5m, 15m, 30m, 1h, 1d, 1wk
        #[arg(short, long, default_value = "1d")]
        interval: Interval,

        /// long (call) or short (put)
        #[arg(short, long, default_value = "long")]
        direction: Direction,
    },

    /// Classify multi-interval trend and volume strength
    Strength {
        #[command(flatten)]
        tickers: TickerArgs,

        /// Intervals to combine
        #[arg(long, value_delimiter = ',', default_value = "15m,1h,1d")]
        intervals: Vec<Interval>,
    },

    /// Review an open long position for exit signals
    Review {
        #[arg(short, long)]
        ticker: String,

        #[arg(short, long)]
        buy_price: f64,

        #[arg(short, long, default_value = "1d")]
        interval: Interval,
    },
}

impl TickerArgs {
    /// Command-line tickers plus the universe file, normalized.
    pub async fn resolve(&self) -> Result<Vec<String>> {
        let mut tickers = self.tickers.clone();
        if let Some(path) = &self.universe_file {
            tickers.extend(FileUniverse::new(path).tickers().await?);
        }
        let tickers = normalize_tickers(tickers);
        if tickers.is_empty() {
            return Err(AppError::BadRequest(
                "no tickers given; pass symbols or --universe-file".to_string(),
            ));
        }
        Ok(tickers)
    }
}

impl Cli {
    /// Run the command and render its report in the selected format.
    pub async fn render(&self, scanner: &Scanner) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match &self.command {
            Command::Scan {
                tickers,
                interval,
                direction,
            } => {
                let tickers = tickers.resolve().await?;
                let report = scanner.scan(&tickers, *interval, *direction).await;
                write_scan(&mut out, self.format, &report)?;
            }
            Command::Strength { tickers, intervals } => {
                if intervals.is_empty() {
                    return Err(AppError::BadRequest(
                        "at least one interval is required".to_string(),
                    ));
                }
                let tickers = tickers.resolve().await?;
                let report = scanner.scan_strength(&tickers, intervals).await;
                write_strength(&mut out, self.format, &report)?;
            }
            Command::Review {
                ticker,
                buy_price,
                interval,
            } => {
                let review = scanner.review_position(ticker, *interval, *buy_price).await?;
                write_review(&mut out, self.format, &review)?;
            }
        }
        Ok(out)
    }

    /// Render, then write to `--output` or stdout. The output file is only
    /// created once the report is complete.
    pub async fn run(&self, scanner: &Scanner) -> Result<()> {
        let report = self.render(scanner).await?;
        emit(self.output.as_deref(), &report)
    }
}

/// Write a finished report to `path`, or stdout when none is given.
pub fn emit(path: Option<&Path>, report: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = BufWriter::new(File::create(path)?);
            file.write_all(report)?;
            file.flush()?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(report)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
