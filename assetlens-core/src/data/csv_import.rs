//! CSV import provider.
//!
//! Reads `{dir}/{SYMBOL}.csv` files with a header row. Recognized columns:
//! `date` (YYYY-MM-DD, required), `close`, `adj_close` (at least one of the two).
//! Empty cells are treated as missing values.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, FetchWindow, RawBar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    #[serde(default, alias = "Close")]
    close: Option<f64>,
    #[serde(default, alias = "Adj Close", alias = "adjclose")]
    adj_close: Option<f64>,
    #[serde(default, alias = "Volume")]
    volume: Option<u64>,
}

/// Provider backed by a directory of per-symbol CSV files.
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `{dir}/{symbol}.csv`, or `None` when the symbol would leave `dir`.
    fn path_for(&self, symbol: &str) -> Option<PathBuf> {
        if symbol.is_empty() || symbol.contains(['/', '\\']) || symbol.chars().all(|c| c == '.') {
            return None;
        }
        Some(self.dir.join(format!("{symbol}.csv")))
    }

    /// Parse CSV content into bars, keeping only dates inside `window`.
    pub fn parse(content: &str, window: FetchWindow) -> Result<Vec<RawBar>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut bars = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            // +2: header row and 1-based numbering
            let row = row.map_err(|e| DataError::Csv(format!("row {}: {e}", line + 2)))?;
            if !window.contains(row.date) {
                continue;
            }
            bars.push(RawBar {
                date: row.date,
                close: row.close,
                adj_close: row.adj_close,
                volume: row.volume,
            });
        }
        Ok(bars)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, symbol: &str, window: FetchWindow) -> Result<FetchResult, DataError> {
        let path = match self.path_for(symbol) {
            Some(path) if path.exists() => path,
            _ => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
        };
        let content = std::fs::read_to_string(&path)?;
        let bars = Self::parse(&content, window)?;
        if bars.is_empty() {
            return Err(DataError::EmptySeries {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}
