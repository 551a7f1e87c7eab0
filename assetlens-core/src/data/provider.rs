//! Data provider traits and structured error types.
//!
//! `DataProvider` abstracts over price sources (Yahoo Finance, CSV import,
//! synthetic) so the pipeline never talks to the network directly and tests
//! can swap in fakes. `MetadataProvider` does the same for descriptive names.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily bar from a data provider (before price-field selection and validation).
///
/// Either price column may be missing for a given day; ingest decides which
/// column to use and drops the holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<u64>,
}

/// Structured error types for data operations.
///
/// These are designed to be displayable in CLI output and in report artifacts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("provider refused the request: {0}")]
    Forbidden(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no usable prices for {symbol}")]
    EmptySeries { symbol: String },

    #[error("CSV import error: {0}")]
    Csv(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// True when the provider answered but had nothing for the symbol.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DataError::SymbolNotFound { .. } | DataError::EmptySeries { .. }
        )
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// How much history to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FetchWindow {
    /// Everything the provider has.
    Max,
    /// Inclusive date window.
    Between { start: NaiveDate, end: NaiveDate },
}

impl FetchWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            FetchWindow::Max => true,
            FetchWindow::Between { start, end } => date >= start && date <= end,
        }
    }
}

/// Trait for price providers.
///
/// `Send + Sync` because acquisition fans out across a rayon pool.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol.
    fn fetch(&self, symbol: &str, window: FetchWindow) -> Result<FetchResult, DataError>;

    /// Check if the provider is currently usable (configured, reachable directory, ...).
    fn is_available(&self) -> bool;
}

/// Trait for descriptive ticker metadata (long names).
pub trait MetadataProvider: Send + Sync {
    fn describe(&self, symbol: &str) -> Result<String, DataError>;
}
