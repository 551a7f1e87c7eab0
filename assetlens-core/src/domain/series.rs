//! TimeSeries — daily closing prices for one ticker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which price column a series was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    /// Split- and dividend-adjusted close. Preferred.
    AdjustedClose,
    /// Raw close. Used when the provider has no adjusted close.
    Close,
}

impl PriceField {
    /// Recognized fields in order of preference.
    pub const PREFERENCE: [PriceField; 2] = [PriceField::AdjustedClose, PriceField::Close];

    pub fn label(&self) -> &'static str {
        match self {
            PriceField::AdjustedClose => "Adjusted Close",
            PriceField::Close => "Close",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (date, price) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// A value tagged with the date it belongs to (daily return, cumulative return).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("dates not strictly increasing at {date} (previous {previous})")]
    NotStrictlyIncreasing { previous: NaiveDate, date: NaiveDate },

    #[error("invalid price {price} on {date}: prices must be finite and positive")]
    InvalidPrice { date: NaiveDate, price: f64 },
}

/// Ordered daily price series.
///
/// Invariants (checked by [`TimeSeries::new`]):
/// - dates strictly increasing, no duplicates
/// - every price finite and > 0
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    field: PriceField,
    points: Vec<PricePoint>,
}

impl TimeSeries {
    pub fn new(field: PriceField, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for point in &points {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(SeriesError::InvalidPrice {
                    date: point.date,
                    price: point.price,
                });
            }
        }
        for w in points.windows(2) {
            if w[1].date <= w[0].date {
                return Err(SeriesError::NotStrictlyIncreasing {
                    previous: w[0].date,
                    date: w[1].date,
                });
            }
        }
        Ok(Self { field, points })
    }

    pub fn field(&self) -> PriceField {
        self.field
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Keep only observations with `start <= date <= end`. `None` leaves that side open.
    ///
    /// Trimming a valid series cannot break its invariants, so this is infallible.
    pub fn trimmed(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> TimeSeries {
        let points = self
            .points
            .iter()
            .filter(|p| start.map_or(true, |s| p.date >= s))
            .filter(|p| end.map_or(true, |e| p.date <= e))
            .copied()
            .collect();
        TimeSeries {
            field: self.field,
            points,
        }
    }

    /// Percentage change between consecutive observations, dated by the later one.
    ///
    /// The first observation has no prior value and is dropped.
    pub fn daily_returns(&self) -> Vec<DatedValue> {
        self.points
            .windows(2)
            .map(|w| DatedValue {
                date: w[1].date,
                value: (w[1].price - w[0].price) / w[0].price,
            })
            .collect()
    }

    /// Attach the cumulative return column. Call once alignment is final.
    pub fn annotate(self) -> AnnotatedSeries {
        let cumulative = match self.points.first() {
            Some(first) => {
                let base = first.price;
                self.points
                    .iter()
                    .map(|p| DatedValue {
                        date: p.date,
                        value: p.price / base - 1.0,
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        AnnotatedSeries {
            series: self,
            cumulative,
        }
    }
}

/// A series plus its derived cumulative return (`price / first_price - 1`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedSeries {
    pub series: TimeSeries,
    pub cumulative: Vec<DatedValue>,
}

impl AnnotatedSeries {
    /// Cumulative return at the last observation.
    pub fn final_cumulative_return(&self) -> Option<f64> {
        self.cumulative.last().map(|c| c.value)
    }
}
