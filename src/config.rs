use crate::error::ConfigError;
use crate::services::{Cache, RuleSet, ScanSettings};
use crate::types::Series;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which market data backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Finnhub,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" | "yfinance" => Ok(ProviderKind::Yahoo),
            "finnhub" => Ok(ProviderKind::Finnhub),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    /// Finnhub API key, required when the provider is Finnhub.
    pub finnhub_api_key: Option<String>,
    /// Maximum concurrent fetches.
    pub concurrency: usize,
    /// Per-fetch timeout.
    pub fetch_timeout: Duration,
    /// Series cache TTL; zero disables the cache.
    pub cache_ttl: Duration,
    pub min_bars: usize,
    pub lookback_bars: usize,
    /// Optional JSON rule set overriding the default thresholds.
    pub rules_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let scan = ScanSettings::default();
        Self {
            provider: ProviderKind::default(),
            finnhub_api_key: None,
            concurrency: scan.concurrency,
            fetch_timeout: scan.fetch_timeout,
            cache_ttl: Duration::from_secs(300),
            min_bars: scan.min_bars,
            lookback_bars: scan.lookback_bars,
            rules_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. Unparseable numbers fall
    /// back to their defaults; an unknown provider is an error.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let number = |key: &str, default: u64| -> u64 {
            get(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        };

        let provider = match get("SCOUT_PROVIDER") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SCOUT_PROVIDER",
                value,
            })?,
            None => defaults.provider,
        };

        let config = Self {
            provider,
            finnhub_api_key: get("FINNHUB_API_KEY").filter(|k| !k.trim().is_empty()),
            concurrency: number("SCOUT_CONCURRENCY", defaults.concurrency as u64).max(1) as usize,
            fetch_timeout: Duration::from_secs(number(
                "SCOUT_FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout.as_secs(),
            )),
            cache_ttl: Duration::from_secs(number(
                "SCOUT_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            min_bars: number("SCOUT_MIN_BARS", defaults.min_bars as u64) as usize,
            lookback_bars: number("SCOUT_LOOKBACK_BARS", defaults.lookback_bars as u64) as usize,
            rules_path: get("SCOUT_RULES_PATH").map(PathBuf::from),
        };

        if config.provider == ProviderKind::Finnhub && config.finnhub_api_key.is_none() {
            return Err(ConfigError::Missing("FINNHUB_API_KEY"));
        }
        Ok(config)
    }

    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            concurrency: self.concurrency,
            fetch_timeout: self.fetch_timeout,
            min_bars: self.min_bars,
            lookback_bars: self.lookback_bars,
        }
    }

    /// Rule set from `rules_path`, or the defaults.
    pub fn rules(&self) -> Result<RuleSet, ConfigError> {
        match &self.rules_path {
            Some(path) => RuleSet::from_json_file(path),
            None => Ok(RuleSet::default()),
        }
    }

    /// Series cache, unless disabled by a zero TTL.
    pub fn series_cache(&self) -> Option<Cache<Series>> {
        (!self.cache_ttl.is_zero()).then(|| Cache::new(self.cache_ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.provider, ProviderKind::Yahoo);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.fetch_timeout, Duration::from_secs(15));
        assert_eq!(config.min_bars, 50);
        assert_eq!(config.lookback_bars, 300);
        assert!(config.series_cache().is_some());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = Config::from_lookup(lookup(&[
            ("SCOUT_CONCURRENCY", "16"),
            ("SCOUT_MIN_BARS", "not-a-number"),
            ("SCOUT_CACHE_TTL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.concurrency, 16);
        assert_eq!(config.min_bars, 50);
        assert!(config.series_cache().is_none());
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let config = Config::from_lookup(lookup(&[("SCOUT_CONCURRENCY", "0")])).unwrap();
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_finnhub_requires_key() {
        let err = Config::from_lookup(lookup(&[("SCOUT_PROVIDER", "finnhub")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("FINNHUB_API_KEY")));

        let config = Config::from_lookup(lookup(&[
            ("SCOUT_PROVIDER", "Finnhub"),
            ("FINNHUB_API_KEY", "abc"),
        ]))
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Finnhub);
    }

    #[test]
    fn test_unknown_provider() {
        let err = Config::from_lookup(lookup(&[("SCOUT_PROVIDER", "bloomberg")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "SCOUT_PROVIDER", .. }));
    }

    #[test]
    fn test_rules_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"{"verdict": {"strong_min": 3}}"#).unwrap();

        let config = Config {
            rules_path: Some(path),
            ..Config::default()
        };
        let rules = config.rules().unwrap();
        assert_eq!(rules.verdict.strong_min, 3);
        assert_eq!(rules.verdict.watchlist_min, 3);
    }
}
