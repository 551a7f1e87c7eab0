//! Acquisition orchestrator: fetch every ticker, ingest, collect a dataset.
//!
//! Tickers are fetched in parallel on the rayon pool. Results come back in
//! input order. A failing ticker is logged and recorded; acquisition only
//! fails when no ticker produced data.

use super::ingest;
use super::provider::{DataError, DataProvider, DataSource, FetchWindow};
use crate::domain::{Ticker, TickerDataset, TimeSeries};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("no tickers requested")]
    EmptyRequest,

    #[error("no data returned for any of: {}", .tickers.join(", "))]
    NoData { tickers: Vec<String> },

    #[error("data provider failed for every ticker (first failure, {ticker}: {source})")]
    Provider {
        ticker: String,
        #[source]
        source: DataError,
    },
}

/// Everything acquisition produced for one request.
#[derive(Debug)]
pub struct AcquiredData {
    /// Series for every ticker that returned data, in input order.
    pub dataset: TickerDataset,
    /// Where each ticker's data came from, in input order.
    pub sources: Vec<(Ticker, DataSource)>,
    /// Tickers that produced no series, in input order.
    pub failures: Vec<(Ticker, DataError)>,
}

impl AcquiredData {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

fn fetch_one(
    provider: &dyn DataProvider,
    ticker: &Ticker,
    window: FetchWindow,
) -> Result<(TimeSeries, DataSource), DataError> {
    let fetched = provider.fetch(ticker.as_str(), window)?;
    let ingested = ingest::ingest(ticker.as_str(), fetched.bars)?;
    Ok((ingested.series, fetched.source))
}

/// Fetch and ingest every ticker.
///
/// One request per ticker, no retries.
pub fn acquire(
    provider: &dyn DataProvider,
    tickers: &[Ticker],
    window: FetchWindow,
) -> Result<AcquiredData, AcquisitionError> {
    if tickers.is_empty() {
        return Err(AcquisitionError::EmptyRequest);
    }
    info!(provider = provider.name(), count = tickers.len(), "acquiring price history");

    let results: Vec<(Ticker, Result<(TimeSeries, DataSource), DataError>)> = tickers
        .par_iter()
        .map(|ticker| (ticker.clone(), fetch_one(provider, ticker, window)))
        .collect();

    let mut dataset = TickerDataset::new();
    let mut sources = Vec::new();
    let mut failures = Vec::new();
    for (ticker, result) in results {
        match result {
            Ok((series, source)) => {
                info!(ticker = %ticker, rows = series.len(), field = %series.field(), "fetched");
                sources.push((ticker.clone(), source));
                dataset.insert(ticker, series);
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "fetch failed");
                failures.push((ticker, e));
            }
        }
    }

    if dataset.is_empty() {
        let tickers: Vec<String> = failures.iter().map(|(t, _)| t.to_string()).collect();
        if failures.iter().all(|(_, e)| e.is_not_found()) {
            return Err(AcquisitionError::NoData { tickers });
        }
        // Surface the first failure that is not a plain "nothing there"
        let idx = failures
            .iter()
            .position(|(_, e)| !e.is_not_found())
            .unwrap_or(0);
        let (ticker, source) = failures.swap_remove(idx);
        return Err(AcquisitionError::Provider {
            ticker: ticker.to_string(),
            source,
        });
    }

    Ok(AcquiredData {
        dataset,
        sources,
        failures,
    })
}
