//! Yahoo Finance data provider.
//!
//! Fetches daily bars from Yahoo's v8 chart API and long names from the v1
//! search API. One request per symbol and no retries: a failure is reported
//! straight back to acquisition, which excludes the ticker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.
//! The CSV import path is the fallback when Yahoo is unavailable.

use super::provider::{
    DataError, DataProvider, DataSource, FetchResult, FetchWindow, MetadataProvider, RawBar,
};
use chrono::{Duration as ChronoDuration, NaiveTime};
use reqwest::blocking::Response;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart/";
const SEARCH_BASE: &str = "https://query2.finance.yahoo.com/v1/finance/search";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance v1 search API response (used for long names).
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: String,
    longname: Option<String>,
    shortname: Option<String>,
}

/// Yahoo Finance provider for prices and descriptions.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Build the chart API URL for a symbol. The symbol is percent-encoded
    /// as a path segment (`^SP500TR` → `%5ESP500TR`).
    fn chart_url(symbol: &str, window: FetchWindow) -> Result<Url, DataError> {
        let mut url = Url::parse(CHART_BASE)
            .map_err(|e| DataError::Other(format!("invalid chart base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| DataError::Other("chart base URL cannot carry a path".into()))?
            .pop_if_empty()
            .push(symbol);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("interval", "1d");
            query.append_pair("includeAdjustedClose", "true");
            match window {
                FetchWindow::Max => {
                    query.append_pair("range", "max");
                }
                FetchWindow::Between { start, end } => {
                    let start_ts = start.and_time(NaiveTime::default()).and_utc().timestamp();
                    let end_ts = (end + ChronoDuration::days(1))
                        .and_time(NaiveTime::default())
                        .and_utc()
                        .timestamp();
                    query.append_pair("period1", &start_ts.to_string());
                    query.append_pair("period2", &end_ts.to_string());
                }
            }
        }
        Ok(url)
    }

    fn search_url(symbol: &str) -> Result<Url, DataError> {
        Url::parse_with_params(
            SEARCH_BASE,
            &[("q", symbol), ("quotesCount", "5"), ("newsCount", "0")],
        )
        .map_err(|e| DataError::Other(format!("invalid search URL: {e}")))
    }

    /// Parse the chart API response into RawBars.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // Listed symbols with no trading history come back without timestamps.
        let timestamps = data.timestamp.unwrap_or_default();

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let close = quote.close.get(i).copied().flatten();
            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());
            let volume = quote.volume.get(i).copied().flatten();

            // Holidays and halted sessions come back as all-null rows
            if close.is_none() && adj_close.is_none() {
                continue;
            }

            bars.push(RawBar {
                date,
                close,
                adj_close,
                volume,
            });
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(bars)
    }

    /// Pick the long name for `symbol` out of a search response.
    fn parse_search(symbol: &str, resp: SearchResponse) -> Result<String, DataError> {
        resp.quotes
            .into_iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .and_then(|q| q.longname.or(q.shortname))
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }

    /// Single GET, mapping HTTP failures to `DataError`.
    fn get(&self, symbol: &str, url: Url) -> Result<Response, DataError> {
        debug!(symbol, %url, "yahoo request");
        let resp = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                DataError::NetworkUnreachable(format!("timed out fetching {symbol}: {e}"))
            } else {
                DataError::NetworkUnreachable(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            return Err(DataError::Forbidden(format!("HTTP {status} for {symbol}")));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::Other(format!("HTTP {status} for {symbol}")));
        }
        Ok(resp)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, window: FetchWindow) -> Result<FetchResult, DataError> {
        let url = Self::chart_url(symbol, window)?;
        let chart: ChartResponse = self.get(symbol, url)?.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;
        let bars = Self::parse_response(symbol, chart)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

impl MetadataProvider for YahooProvider {
    fn describe(&self, symbol: &str) -> Result<String, DataError> {
        let url = Self::search_url(symbol)?;
        let resp: SearchResponse = self.get(symbol, url)?.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse search for {symbol}: {e}"))
        })?;
        Self::parse_search(symbol, resp)
    }
}
