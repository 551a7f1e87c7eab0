//! Return statistics — pure functions over one aligned price series.
//!
//! Every metric is a pure function: prices or daily returns in, scalar out.
//! [`compute_statistics`] assembles them into a [`StatisticsRecord`] with the
//! reporting conventions applied (percentages ×100, rounded to 4 decimals).

use assetlens_core::domain::AnnotatedSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calendar days per year used for elapsed-time calculations.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Trading days per year used to annualize volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Decimal places kept in every reported statistic.
pub const REPORT_DECIMALS: i32 = 4;

/// Descriptive statistics for one ticker over its aligned window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub years: f64,
    pub cagr_pct: f64,
    pub max_drawdown_pct: f64,
    pub volatility_pct: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
    pub cumulative_return_pct: f64,
    /// Number of price observations the statistics were computed from.
    pub observations: usize,
}

impl StatisticsRecord {
    /// Row labels, in display order.
    pub const LABELS: [&'static str; 9] = [
        "Start Date",
        "End Date",
        "Years",
        "CAGR (%)",
        "Max Drawdown (%)",
        "Volatility (%)",
        "Skewness",
        "Excess Kurtosis",
        "Cumulative Return (%)",
    ];

    /// Display values matching [`StatisticsRecord::LABELS`].
    pub fn display_values(&self) -> [String; 9] {
        [
            self.start_date.to_string(),
            self.end_date.to_string(),
            format!("{:.4}", self.years),
            format!("{:.4}", self.cagr_pct),
            format!("{:.4}", self.max_drawdown_pct),
            format!("{:.4}", self.volatility_pct),
            format!("{:.4}", self.skewness),
            format!("{:.4}", self.excess_kurtosis),
            format!("{:.4}", self.cumulative_return_pct),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatisticsError {
    #[error("need at least 2 price observations, got {count}")]
    InsufficientObservations { count: usize },

    #[error("need at least 2 daily returns, got {count}")]
    InsufficientReturns { count: usize },

    #[error("{metric} is not a finite number")]
    NonFinite { metric: &'static str },
}

/// Compute the full statistics record for one annotated series.
pub fn compute_statistics(data: &AnnotatedSeries) -> Result<StatisticsRecord, StatisticsError> {
    let points = data.series.points();
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => (first, last),
        _ => {
            return Err(StatisticsError::InsufficientObservations {
                count: points.len(),
            })
        }
    };

    let years = years_between(first.date, last.date);
    let final_value = data
        .final_cumulative_return()
        .ok_or(StatisticsError::InsufficientObservations { count: 0 })?;
    let growth = cagr(final_value, years);

    let prices = data.series.prices();
    let drawdown = max_drawdown(&prices);

    let returns = daily_returns(&prices);
    if returns.len() < 2 {
        return Err(StatisticsError::InsufficientReturns {
            count: returns.len(),
        });
    }

    let record = StatisticsRecord {
        start_date: first.date,
        end_date: last.date,
        years: finite("years", round_to(years, REPORT_DECIMALS))?,
        cagr_pct: finite("CAGR", round_to(growth * 100.0, REPORT_DECIMALS))?,
        max_drawdown_pct: finite("max drawdown", round_to(drawdown * 100.0, REPORT_DECIMALS))?,
        volatility_pct: finite(
            "volatility",
            round_to(annualized_volatility(&returns) * 100.0, REPORT_DECIMALS),
        )?,
        skewness: finite("skewness", round_to(skewness(&returns), REPORT_DECIMALS))?,
        excess_kurtosis: finite(
            "excess kurtosis",
            round_to(excess_kurtosis(&returns), REPORT_DECIMALS),
        )?,
        cumulative_return_pct: finite(
            "cumulative return",
            round_to(final_value * 100.0, REPORT_DECIMALS),
        )?,
        observations: points.len(),
    };
    Ok(record)
}

fn finite(metric: &'static str, value: f64) -> Result<f64, StatisticsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StatisticsError::NonFinite { metric })
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Elapsed calendar time in years (days / 365.25).
pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}

/// Compound Annual Growth Rate from a total return fraction over `years`.
///
/// Not clamped: a short window with a large move gives an extreme (possibly
/// infinite) rate. Non-positive `years` yields NaN.
pub fn cagr(total_return: f64, years: f64) -> f64 {
    if years <= 0.0 {
        return f64::NAN;
    }
    (total_return + 1.0).powf(1.0 / years) - 1.0
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if prices are constant or monotonically increasing.
pub fn max_drawdown(prices: &[f64]) -> f64 {
    let Some(&first) = prices.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &p in prices {
        if p > peak {
            peak = p;
        }
        if peak > 0.0 {
            let dd = (p - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Annualized volatility: sample standard deviation of daily returns × sqrt(252).
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    std_dev(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Skewness (third standardized moment), biased population estimator.
///
/// skew = m3 / m2^1.5 with m_k = (1/n) * sum((x_i - mean)^k)
pub fn skewness(returns: &[f64]) -> f64 {
    let m2 = central_moment(returns, 2);
    if m2 < 1e-30 {
        return 0.0;
    }
    central_moment(returns, 3) / m2.powf(1.5)
}

/// Excess kurtosis (Fisher), biased population estimator.
///
/// kurt = m4 / m2^2 - 3. Zero for a normal distribution.
pub fn excess_kurtosis(returns: &[f64]) -> f64 {
    let m2 = central_moment(returns, 2);
    if m2 < 1e-30 {
        return 0.0;
    }
    central_moment(returns, 4) / (m2 * m2) - 3.0
}

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Percentage change between consecutive prices; the first price has no return.
pub fn daily_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn central_moment(values: &[f64], k: i32) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(values);
    values.iter().map(|v| (v - mean).powi(k)).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetlens_core::domain::{PriceField, PricePoint, TimeSeries};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn annotated(points: &[(&str, f64)]) -> AnnotatedSeries {
        let points = points.iter().map(|(s, p)| PricePoint::new(d(s), *p)).collect();
        TimeSeries::new(PriceField::AdjustedClose, points)
            .unwrap()
            .annotate()
    }

    /// Consecutive daily series from a price list.
    fn daily(prices: &[f64]) -> AnnotatedSeries {
        let start = d("2024-01-01");
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(start + chrono::Duration::days(i as i64), *p))
            .collect();
        TimeSeries::new(PriceField::Close, points).unwrap().annotate()
    }

    // ── Record assembly ──

    #[test]
    fn record_for_known_series() {
        let a = annotated(&[
            ("2020-01-01", 100.0),
            ("2020-07-01", 120.0),
            ("2021-01-01", 90.0),
            ("2022-01-01", 121.0),
        ]);
        let r = compute_statistics(&a).unwrap();

        let years = 731.0 / 365.25;
        assert_eq!(r.start_date, d("2020-01-01"));
        assert_eq!(r.end_date, d("2022-01-01"));
        assert_eq!(r.years, round_to(years, 4));
        assert_eq!(r.cumulative_return_pct, 21.0);
        assert_eq!(r.max_drawdown_pct, -25.0);
        let expected_cagr = (1.21_f64.powf(1.0 / years) - 1.0) * 100.0;
        assert!((r.cagr_pct - expected_cagr).abs() < 1e-4);
        assert_eq!(r.observations, 4);
    }

    #[test]
    fn single_observation_is_insufficient() {
        let a = daily(&[100.0]);
        assert_eq!(
            compute_statistics(&a).unwrap_err(),
            StatisticsError::InsufficientObservations { count: 1 }
        );
    }

    #[test]
    fn two_observations_have_one_return() {
        let a = daily(&[100.0, 101.0]);
        assert_eq!(
            compute_statistics(&a).unwrap_err(),
            StatisticsError::InsufficientReturns { count: 1 }
        );
    }

    #[test]
    fn constant_prices_are_all_zero() {
        let r = compute_statistics(&daily(&[50.0; 10])).unwrap();
        assert_eq!(r.cagr_pct, 0.0);
        assert_eq!(r.max_drawdown_pct, 0.0);
        assert_eq!(r.volatility_pct, 0.0);
        assert_eq!(r.skewness, 0.0);
        assert_eq!(r.excess_kurtosis, 0.0);
        assert_eq!(r.cumulative_return_pct, 0.0);
    }

    #[test]
    fn explosive_short_window_is_non_finite() {
        let a = daily(&[1.0, 100.0, 10_000.0]);
        let err = compute_statistics(&a).unwrap_err();
        assert!(matches!(err, StatisticsError::NonFinite { metric: "CAGR" }));
    }

    #[test]
    fn record_is_rounded_to_four_decimals() {
        let r = compute_statistics(&daily(&[100.0, 103.3, 101.7, 104.9, 99.1])).unwrap();
        for v in [
            r.years,
            r.cagr_pct,
            r.max_drawdown_pct,
            r.volatility_pct,
            r.skewness,
            r.excess_kurtosis,
            r.cumulative_return_pct,
        ] {
            assert!((v * 1e4 - (v * 1e4).round()).abs() < 1e-6, "{v} not rounded");
        }
    }

    #[test]
    fn display_values_follow_labels() {
        let r = compute_statistics(&daily(&[100.0, 110.0, 121.0])).unwrap();
        let values = r.display_values();
        assert_eq!(values.len(), StatisticsRecord::LABELS.len());
        assert_eq!(values[0], "2024-01-01");
        assert_eq!(values[8], "21.0000");
    }

    // ── CAGR ──

    #[test]
    fn cagr_doubling_in_one_year() {
        assert!((cagr(1.0, 1.0) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn cagr_doubling_in_two_years() {
        assert!((cagr(1.0, 2.0) - (2.0_f64.sqrt() - 1.0)).abs() < 1e-10);
    }

    #[test]
    fn cagr_zero_years_is_nan() {
        assert!(cagr(0.5, 0.0).is_nan());
    }

    // ── Max drawdown ──

    #[test]
    fn max_drawdown_from_running_peak() {
        let prices = vec![100.0, 120.0, 90.0, 130.0, 104.0];
        assert!((max_drawdown(&prices) - (-0.25)).abs() < 1e-10);
    }

    #[test]
    fn max_drawdown_monotonic_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    // ── Volatility ──

    #[test]
    fn volatility_uses_sample_std() {
        let returns = vec![0.01, -0.01, 0.02, 0.0];
        let mean = 0.005;
        let var = returns.iter().map(|r: &f64| (r - mean).powi(2)).sum::<f64>() / 3.0;
        assert!((annualized_volatility(&returns) - var.sqrt() * 252f64.sqrt()).abs() < 1e-12);
    }

    // ── Skewness / kurtosis ──

    #[test]
    fn symmetric_returns_have_zero_skew() {
        let returns = vec![0.01, -0.01, 0.01, -0.01];
        assert!(skewness(&returns).abs() < 1e-12);
    }

    #[test]
    fn two_point_distribution_kurtosis() {
        // m4 / m2^2 = 1 for a symmetric two-point distribution
        let returns = vec![0.01, -0.01, 0.01, -0.01];
        assert!((excess_kurtosis(&returns) - (-2.0)).abs() < 1e-9);
    }

    #[test]
    fn right_tail_has_positive_skew() {
        let returns = vec![0.0, 0.0, 0.0, 0.0, 0.1];
        // m2 = 0.0016, m3 = 0.000096, m2^1.5 = 0.000064
        assert!((skewness(&returns) - 1.5).abs() < 1e-9);
        // m4 = 0.00000832, m2^2 = 0.00000256
        assert!((excess_kurtosis(&returns) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn zero_variance_gives_zero_moments() {
        let returns = vec![0.003; 8];
        assert_eq!(skewness(&returns), 0.0);
        assert_eq!(excess_kurtosis(&returns), 0.0);
    }

    // ── Helpers ──

    #[test]
    fn daily_returns_drop_first() {
        let r = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.1).abs() < 1e-12);
        assert!((r[1] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn round_to_four_places() {
        assert_eq!(round_to(1.234_56, 4), 1.2346);
        assert_eq!(round_to(-0.000_04, 4), -0.0);
    }

    #[test]
    fn round_to_breaks_ties_to_even() {
        assert_eq!(round_to(0.5, 0), 0.0);
        assert_eq!(round_to(1.5, 0), 2.0);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
        // 0.125 and 0.375 are exact in binary
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
    }
}
