//! Ticker universes: where the list of symbols to scan comes from.

use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Trim, upper-case, drop empties and dedupe, keeping first-seen order.
pub fn normalize_tickers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[async_trait]
pub trait TickerUniverse: Send + Sync {
    async fn tickers(&self) -> Result<Vec<String>, FetchError>;
}

/// A fixed list.
pub struct StaticUniverse {
    tickers: Vec<String>,
}

impl StaticUniverse {
    pub fn new<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tickers: normalize_tickers(tickers),
        }
    }
}

#[async_trait]
impl TickerUniverse for StaticUniverse {
    async fn tickers(&self) -> Result<Vec<String>, FetchError> {
        Ok(self.tickers.clone())
    }
}

/// Symbols read from a file, separated by commas, whitespace or newlines.
/// Lines starting with `#` are ignored.
pub struct FileUniverse {
    path: PathBuf,
}

impl FileUniverse {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TickerUniverse for FileUniverse {
    async fn tickers(&self) -> Result<Vec<String>, FetchError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::Unavailable(format!("{}: {}", self.path.display(), e)))?;

        let tickers = normalize_tickers(
            text.lines()
                .filter(|line| !line.trim_start().starts_with('#'))
                .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace())),
        );
        debug!(path = %self.path.display(), count = tickers.len(), "loaded ticker file");
        Ok(tickers)
    }
}

/// Caches another universe for a TTL. Owned by the caller, no global state.
pub struct CachedUniverse {
    inner: Box<dyn TickerUniverse>,
    ttl: Duration,
    cached: RwLock<Option<(Instant, Vec<String>)>>,
}

impl CachedUniverse {
    pub fn new(inner: Box<dyn TickerUniverse>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: RwLock::new(None),
        }
    }
}

#[async_trait]
impl TickerUniverse for CachedUniverse {
    async fn tickers(&self) -> Result<Vec<String>, FetchError> {
        if let Some((at, tickers)) = self.cached.read().await.as_ref() {
            if at.elapsed() < self.ttl {
                return Ok(tickers.clone());
            }
        }

        let fresh = self.inner.tickers().await?;
        info!(count = fresh.len(), "refreshed ticker universe");
        *self.cached.write().await = Some((Instant::now(), fresh.clone()));
        Ok(fresh)
    }
}
