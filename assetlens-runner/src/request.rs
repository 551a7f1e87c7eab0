//! Request resolution: raw user input → validated [`AnalysisRequest`].
//!
//! Built once per run and passed by value; nothing downstream reads user
//! input again.

use crate::correlation::FieldFilter;
use assetlens_core::data::{AlignmentPolicy, DateRange};
use assetlens_core::domain::{parse_ticker_list, Ticker, TickerError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("no tickers given")]
    NoTickers,

    #[error("invalid ticker: {0}")]
    InvalidTicker(#[from] TickerError),

    #[error("start date {date} is outside [{min}, {max}]")]
    StartOutOfBounds {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },

    #[error("end date {date} is outside [{min}, {max}]")]
    EndOutOfBounds {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },

    #[error("unknown alignment '{0}' (expected all, earliest-common or custom)")]
    UnknownAlignment(String),
}

/// Earliest accepted custom start date.
pub fn min_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// User-facing alignment choice, before dates are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignmentChoice {
    #[default]
    All,
    EarliestCommon,
    Custom,
}

impl FromStr for AlignmentChoice {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "all" | "all-available" => Ok(AlignmentChoice::All),
            "earliest-common" | "earliest-common-date" => Ok(AlignmentChoice::EarliestCommon),
            "custom" | "custom-range" => Ok(AlignmentChoice::Custom),
            other => Err(RequestError::UnknownAlignment(other.to_string())),
        }
    }
}

impl fmt::Display for AlignmentChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AlignmentChoice::All => "all",
            AlignmentChoice::EarliestCommon => "earliest-common",
            AlignmentChoice::Custom => "custom",
        })
    }
}

/// Raw inputs as collected from flags and/or a config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestInput {
    /// Free-text comma-separated ticker list.
    pub tickers: String,
    pub alignment: AlignmentChoice,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub correlation_field: FieldFilter,
    pub describe: bool,
}

/// A fully resolved analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub tickers: Vec<Ticker>,
    pub alignment: AlignmentPolicy,
    pub correlation_field: FieldFilter,
    pub describe: bool,
}

impl AnalysisRequest {
    /// Validate `input` against `today`.
    ///
    /// Custom start defaults to January 1 of `today`'s year and must lie in
    /// [1900-01-01, today]. Custom end defaults to `today` and must lie in
    /// [start, today]. Dates are ignored for the other alignment choices.
    pub fn resolve(input: RequestInput, today: NaiveDate) -> Result<Self, RequestError> {
        let tickers = parse_ticker_list(&input.tickers)?;
        if tickers.is_empty() {
            return Err(RequestError::NoTickers);
        }

        let alignment = match input.alignment {
            AlignmentChoice::All => AlignmentPolicy::AllAvailable,
            AlignmentChoice::EarliestCommon => AlignmentPolicy::EarliestCommonDate,
            AlignmentChoice::Custom => {
                AlignmentPolicy::CustomRange(Some(resolve_custom_range(input.start, input.end, today)?))
            }
        };

        Ok(Self {
            tickers,
            alignment,
            correlation_field: input.correlation_field,
            describe: input.describe,
        })
    }
}

/// Apply defaults and bounds to a custom date range.
pub fn resolve_custom_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DateRange, RequestError> {
    let min = min_start_date();
    let start = start.unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
    });
    if start < min || start > today {
        return Err(RequestError::StartOutOfBounds {
            date: start,
            min,
            max: today,
        });
    }

    let end = end.unwrap_or(today);
    if end < start || end > today {
        return Err(RequestError::EndOutOfBounds {
            date: end,
            min: start,
            max: today,
        });
    }

    // start <= end holds here, so construction cannot fail
    DateRange::new(start, end).map_err(|_| RequestError::EndOutOfBounds {
        date: end,
        min: start,
        max: today,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn today() -> NaiveDate {
        d("2024-06-15")
    }

    fn input(tickers: &str, alignment: AlignmentChoice) -> RequestInput {
        RequestInput {
            tickers: tickers.into(),
            alignment,
            ..RequestInput::default()
        }
    }

    #[test]
    fn resolves_tickers_and_policy() {
        let req =
            AnalysisRequest::resolve(input("aapl, msft,,AAPL", AlignmentChoice::EarliestCommon), today())
                .unwrap();
        let tickers: Vec<&str> = req.tickers.iter().map(|t| t.as_str()).collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(req.alignment, AlignmentPolicy::EarliestCommonDate);
        assert_eq!(req.correlation_field, FieldFilter::default());
    }

    #[test]
    fn empty_ticker_list_rejected() {
        let err = AnalysisRequest::resolve(input(" , ,", AlignmentChoice::All), today()).unwrap_err();
        assert_eq!(err, RequestError::NoTickers);
    }

    #[test]
    fn custom_defaults_to_year_to_date() {
        let range = resolve_custom_range(None, None, today()).unwrap();
        assert_eq!(range.start(), d("2024-01-01"));
        assert_eq!(range.end(), today());
    }

    #[test]
    fn custom_start_bounds() {
        let err = resolve_custom_range(Some(d("1899-12-31")), None, today()).unwrap_err();
        assert!(matches!(err, RequestError::StartOutOfBounds { .. }));
        let err = resolve_custom_range(Some(d("2024-06-16")), None, today()).unwrap_err();
        assert!(matches!(err, RequestError::StartOutOfBounds { .. }));
        assert!(resolve_custom_range(Some(d("1900-01-01")), None, today()).is_ok());
    }

    #[test]
    fn custom_end_bounds() {
        let err =
            resolve_custom_range(Some(d("2024-03-01")), Some(d("2024-02-01")), today()).unwrap_err();
        assert!(matches!(err, RequestError::EndOutOfBounds { .. }));
        let err = resolve_custom_range(None, Some(d("2025-01-01")), today()).unwrap_err();
        assert!(matches!(err, RequestError::EndOutOfBounds { .. }));
        let same = resolve_custom_range(Some(d("2024-03-01")), Some(d("2024-03-01")), today()).unwrap();
        assert_eq!(same.start(), same.end());
    }

    #[test]
    fn dates_ignored_without_custom_alignment() {
        let mut raw = input("SPY", AlignmentChoice::All);
        raw.start = Some(d("1800-01-01"));
        let req = AnalysisRequest::resolve(raw, today()).unwrap();
        assert_eq!(req.alignment, AlignmentPolicy::AllAvailable);
    }

    #[test]
    fn custom_alignment_carries_range() {
        let mut raw = input("SPY", AlignmentChoice::Custom);
        raw.start = Some(d("2023-01-01"));
        let req = AnalysisRequest::resolve(raw, today()).unwrap();
        match req.alignment {
            AlignmentPolicy::CustomRange(Some(range)) => {
                assert_eq!(range.start(), d("2023-01-01"));
                assert_eq!(range.end(), today());
            }
            other => panic!("expected custom range, got {other:?}"),
        }
    }

    #[test]
    fn alignment_choice_parsing() {
        assert_eq!("all".parse::<AlignmentChoice>().unwrap(), AlignmentChoice::All);
        assert_eq!(
            "Earliest_Common".parse::<AlignmentChoice>().unwrap(),
            AlignmentChoice::EarliestCommon
        );
        assert_eq!("custom".parse::<AlignmentChoice>().unwrap(), AlignmentChoice::Custom);
        assert!(matches!(
            "weekly".parse::<AlignmentChoice>(),
            Err(RequestError::UnknownAlignment(_))
        ));
        assert_eq!(AlignmentChoice::EarliestCommon.to_string(), "earliest-common");
    }
}
