//! Date alignment across tickers.
//!
//! Applies an [`AlignmentPolicy`] to a [`TickerDataset`]. Series are trimmed,
//! never filled: a ticker keeps only its own observations inside the window.
//! Tickers left empty after trimming are dropped.

use crate::domain::TickerDataset;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignmentError {
    #[error("no overlapping data: every series is empty after alignment")]
    NoOverlappingData,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("start date {start} is after end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

/// Inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = DateRangeError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// How to bring tickers with different histories onto one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Every ticker keeps its full history.
    #[default]
    AllAvailable,
    /// Every ticker starts at the latest first date among them.
    EarliestCommonDate,
    /// Every ticker is cut to the range. `None` leaves the data untouched.
    CustomRange(Option<DateRange>),
}

impl AlignmentPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            AlignmentPolicy::AllAvailable => "All available data",
            AlignmentPolicy::EarliestCommonDate => "Earliest common date",
            AlignmentPolicy::CustomRange(_) => "Custom date range",
        }
    }
}

/// Latest first date across the dataset's non-empty series.
pub fn common_start(dataset: &TickerDataset) -> Option<NaiveDate> {
    dataset.iter().filter_map(|(_, s)| s.first_date()).max()
}

/// Apply `policy` to `dataset`.
///
/// Fails with [`AlignmentError::NoOverlappingData`] when nothing survives.
pub fn align(
    dataset: TickerDataset,
    policy: &AlignmentPolicy,
) -> Result<TickerDataset, AlignmentError> {
    let (start, end) = match policy {
        AlignmentPolicy::AllAvailable | AlignmentPolicy::CustomRange(None) => (None, None),
        AlignmentPolicy::EarliestCommonDate => (common_start(&dataset), None),
        AlignmentPolicy::CustomRange(Some(range)) => (Some(range.start), Some(range.end)),
    };
    debug!(policy = policy.label(), ?start, ?end, "aligning");

    let before = dataset.len();
    let aligned: TickerDataset = dataset
        .into_iter()
        .map(|(ticker, series)| {
            let trimmed = series.trimmed(start, end);
            (ticker, trimmed)
        })
        .collect::<TickerDataset>()
        .without_empty();

    if aligned.is_empty() {
        return Err(AlignmentError::NoOverlappingData);
    }
    if aligned.len() < before {
        info!(
            dropped = before - aligned.len(),
            "tickers with no data inside the alignment window were dropped"
        );
    }
    Ok(aligned)
}
