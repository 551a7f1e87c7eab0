//! Daily-return correlation across ranked tickers.
//!
//! Steps: per-ticker daily returns → inner join on date → pairwise Pearson
//! → arrange in rank order, mirror, round.

use crate::metrics::{mean_f64, round_to, REPORT_DECIMALS};
use assetlens_core::domain::{DatedValue, PriceField, Ticker, TickerDataset, TimeSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
    #[error("correlation needs at least 2 tickers with {filter} prices, got {count}")]
    TooFewTickers { count: usize, filter: FieldFilter },

    #[error("only {rows} dates shared by every ticker; need at least 2")]
    InsufficientOverlap { rows: usize },
}

/// Which series take part in the correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "field")]
pub enum FieldFilter {
    /// Only series read from this price field.
    Only(PriceField),
    /// Every series, whatever field it was read from.
    Any,
}

impl Default for FieldFilter {
    fn default() -> Self {
        FieldFilter::Only(PriceField::AdjustedClose)
    }
}

impl FieldFilter {
    pub fn accepts(&self, series: &TimeSeries) -> bool {
        match self {
            FieldFilter::Only(field) => series.field() == *field,
            FieldFilter::Any => true,
        }
    }
}

impl std::fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldFilter::Only(field) => write!(f, "{field}"),
            FieldFilter::Any => f.write_str("any"),
        }
    }
}

impl std::str::FromStr for FieldFilter {
    type Err = String;

    /// Accepts `adjusted-close`, `close` and `any` (underscores also allowed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "adjusted-close" | "adj-close" => Ok(FieldFilter::Only(PriceField::AdjustedClose)),
            "close" => Ok(FieldFilter::Only(PriceField::Close)),
            "any" => Ok(FieldFilter::Any),
            other => Err(format!(
                "unknown correlation field '{other}' (expected adjusted-close, close or any)"
            )),
        }
    }
}

/// Square, symmetric correlation matrix in rank order.
///
/// `None` marks a pair where one side had zero variance over the joined dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub tickers: Vec<Ticker>,
    pub values: Vec<Vec<Option<f64>>>,
    /// Number of dates every ticker had a return on.
    pub joined_rows: usize,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn get(&self, row: &Ticker, col: &Ticker) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == row)?;
        let j = self.tickers.iter().position(|t| t == col)?;
        self.values[i][j]
    }
}

/// Returns of every ticker on the dates all of them share.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedReturns {
    pub dates: Vec<NaiveDate>,
    /// One column per input series, each `dates.len()` long.
    pub columns: Vec<Vec<f64>>,
}

/// Dated daily returns of one series.
pub fn daily_return_series(series: &TimeSeries) -> Vec<DatedValue> {
    series.daily_returns()
}

/// Inner join on date: keep only dates present in every input series.
///
/// Dates come out ascending. With no input series the result is empty.
pub fn inner_join_returns(series: &[Vec<DatedValue>]) -> JoinedReturns {
    let Some((head, rest)) = series.split_first() else {
        return JoinedReturns {
            dates: Vec::new(),
            columns: Vec::new(),
        };
    };

    let lookups: Vec<HashMap<NaiveDate, f64>> = rest
        .iter()
        .map(|s| s.iter().map(|v| (v.date, v.value)).collect())
        .collect();

    let mut rows: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    'dates: for first in head {
        let mut row = Vec::with_capacity(series.len());
        row.push(first.value);
        for lookup in &lookups {
            match lookup.get(&first.date) {
                Some(v) => row.push(*v),
                None => continue 'dates,
            }
        }
        rows.insert(first.date, row);
    }

    let mut columns = vec![Vec::with_capacity(rows.len()); series.len()];
    let mut dates = Vec::with_capacity(rows.len());
    for (date, row) in rows {
        dates.push(date);
        for (col, value) in columns.iter_mut().zip(row) {
            col.push(value);
        }
    }
    JoinedReturns { dates, columns }
}

/// Pearson correlation coefficient.
///
/// `None` when the inputs differ in length, have fewer than 2 points, or
/// either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean_f64(x);
    let my = mean_f64(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx < 1e-30 || syy < 1e-30 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Correlation of daily returns across `ranked` tickers.
///
/// Tickers rejected by `filter` (or absent from `dataset`) are left out; the
/// rest keep their rank order on both axes.
pub fn correlation_matrix(
    dataset: &TickerDataset,
    ranked: &[Ticker],
    filter: FieldFilter,
) -> Result<CorrelationMatrix, CorrelationError> {
    let selected: Vec<(&Ticker, &TimeSeries)> = ranked
        .iter()
        .filter_map(|t| dataset.get(t).map(|s| (t, s)))
        .filter(|(_, s)| filter.accepts(s))
        .collect();
    if selected.len() < 2 {
        return Err(CorrelationError::TooFewTickers {
            count: selected.len(),
            filter,
        });
    }

    let returns: Vec<Vec<DatedValue>> = selected
        .iter()
        .map(|(_, s)| daily_return_series(s))
        .collect();
    let joined = inner_join_returns(&returns);
    let rows = joined.dates.len();
    debug!(tickers = selected.len(), rows, "joined daily returns");
    if rows < 2 {
        return Err(CorrelationError::InsufficientOverlap { rows });
    }

    let n = selected.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson(&joined.columns[i], &joined.columns[j])
                .map(|r| round_to(r, REPORT_DECIMALS));
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        tickers: selected.into_iter().map(|(t, _)| t.clone()).collect(),
        values,
        joined_rows: rows,
    })
}
