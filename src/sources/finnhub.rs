//! Finnhub candle API provider.

use super::{finish_series, validate_symbol, SeriesProvider, SeriesRequest};
use crate::error::FetchError;
use crate::types::{Candle, Series};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const FINNHUB_URL: &str = "https://finnhub.io/api/v1";

/// Column-oriented candle payload.
#[derive(Debug, Deserialize)]
struct FinnhubCandles {
    /// "ok" or "no_data"
    s: String,
    #[serde(default)]
    t: Vec<i64>,
    #[serde(default)]
    o: Vec<f64>,
    #[serde(default)]
    h: Vec<f64>,
    #[serde(default)]
    l: Vec<f64>,
    #[serde(default)]
    c: Vec<f64>,
    #[serde(default)]
    v: Vec<f64>,
}

fn parse_candles(symbol: &str, body: &str) -> Result<Vec<Candle>, FetchError> {
    let data: FinnhubCandles =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    match data.s.as_str() {
        "ok" => {}
        "no_data" => return Err(FetchError::Empty(symbol.to_string())),
        other => return Err(FetchError::Malformed(format!("status {}", other))),
    }

    let n = data.t.len();
    if [&data.o, &data.h, &data.l, &data.c, &data.v]
        .iter()
        .any(|col| col.len() != n)
    {
        return Err(FetchError::Malformed("column lengths differ".to_string()));
    }

    Ok((0..n)
        .map(|i| Candle::new(data.t[i] * 1000, data.o[i], data.h[i], data.l[i], data.c[i], data.v[i]))
        .collect())
}

/// Finnhub series provider. Requires an API key.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
}

impl FinnhubProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl SeriesProvider for FinnhubProvider {
    fn name(&self) -> &str {
        "finnhub"
    }

    async fn fetch_series(&self, request: &SeriesRequest) -> Result<Series, FetchError> {
        let symbol = request.symbol.trim().to_uppercase();
        validate_symbol(&symbol)?;
        let (start, end) = request.lookback.window(request.interval, Utc::now());
        debug!(symbol = %symbol, interval = %request.interval, "fetching finnhub candles");

        let response = self
            .client
            .get(format!("{}/stock/candle", FINNHUB_URL))
            .query(&[
                ("symbol", symbol.clone()),
                ("resolution", request.interval.finnhub_resolution().to_string()),
                ("from", start.timestamp().to_string()),
                ("to", end.timestamp().to_string()),
                ("token", self.api_key.clone()),
            ])
            .send()
            .await?;
        match response.status() {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(FetchError::UnknownSymbol(symbol)),
            s => return Err(FetchError::Unavailable(format!("HTTP {}", s))),
        }
        let body = response.text().await?;

        let (series, dropped) =
            Series::from_raw(request.symbol.clone(), request.interval, parse_candles(&symbol, &body)?);
        if dropped > 0 {
            warn!(symbol = %symbol, dropped, "dropped invalid or duplicate bars");
        }
        finish_series(series, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok_payload() {
        let body = r#"{"s":"ok","t":[1700000000,1700086400],
            "o":[10,11],"h":[12,13],"l":[9,10],"c":[11,12],"v":[100,200]}"#;
        let candles = parse_candles("AAPL", body).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].time, 1_700_086_400_000);
        assert_eq!(candles[1].volume, 200.0);
    }

    #[test]
    fn test_no_data_is_empty() {
        assert_eq!(
            parse_candles("ZZZZ", r#"{"s":"no_data"}"#),
            Err(FetchError::Empty("ZZZZ".to_string()))
        );
    }

    #[test]
    fn test_ragged_columns_are_malformed() {
        let body = r#"{"s":"ok","t":[1,2],"o":[1],"h":[1,2],"l":[1,2],"c":[1,2],"v":[1,2]}"#;
        assert!(matches!(parse_candles("X", body), Err(FetchError::Malformed(_))));
    }
}
