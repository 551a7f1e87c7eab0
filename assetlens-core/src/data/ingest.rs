//! Ingest pipeline: raw provider bars → validated `TimeSeries`.
//!
//! Steps: pick the price field, drop unusable rows, sort, dedupe dates.

use super::provider::{DataError, RawBar};
use crate::domain::{PriceField, PricePoint, TimeSeries};
use std::collections::BTreeMap;
use tracing::debug;

/// Counts of what ingest discarded, for logging and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub input_rows: usize,
    pub dropped_invalid: usize,
    pub dropped_duplicates: usize,
}

/// Result of ingesting one symbol.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub series: TimeSeries,
    pub stats: IngestStats,
}

fn is_valid_price(price: Option<f64>) -> bool {
    matches!(price, Some(p) if p.is_finite() && p > 0.0)
}

/// First field in preference order with at least one usable value.
pub fn select_price_field(bars: &[RawBar]) -> Option<PriceField> {
    PriceField::PREFERENCE
        .into_iter()
        .find(|field| bars.iter().any(|b| is_valid_price(price_of(b, *field))))
}

fn price_of(bar: &RawBar, field: PriceField) -> Option<f64> {
    match field {
        PriceField::AdjustedClose => bar.adj_close,
        PriceField::Close => bar.close,
    }
}

/// Run the full ingest pipeline for one symbol.
///
/// Duplicate dates keep the last row seen.
pub fn ingest(symbol: &str, bars: Vec<RawBar>) -> Result<IngestResult, DataError> {
    let input_rows = bars.len();
    let field = select_price_field(&bars).ok_or_else(|| DataError::EmptySeries {
        symbol: symbol.to_string(),
    })?;

    let mut dropped_invalid = 0;
    let mut by_date = BTreeMap::new();
    for bar in &bars {
        let price = price_of(bar, field);
        match price {
            Some(p) if is_valid_price(price) => {
                by_date.insert(bar.date, p);
            }
            _ => dropped_invalid += 1,
        }
    }
    let dropped_duplicates = input_rows - dropped_invalid - by_date.len();

    let points = by_date
        .into_iter()
        .map(|(date, price)| PricePoint::new(date, price))
        .collect();
    let series =
        TimeSeries::new(field, points).map_err(|e| DataError::Other(format!("{symbol}: {e}")))?;

    let stats = IngestStats {
        input_rows,
        dropped_invalid,
        dropped_duplicates,
    };
    debug!(
        symbol,
        field = %field,
        rows = series.len(),
        dropped_invalid,
        dropped_duplicates,
        "ingested"
    );

    Ok(IngestResult { series, stats })
}
