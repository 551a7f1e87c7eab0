//! Renderer-neutral cumulative-return chart.
//!
//! Holds everything a plotting front end needs (traces in rank order, legend
//! labels, axis titles, tick format) without doing any drawing.

use crate::ranking::RankedStatistics;
use assetlens_core::domain::{AnnotatedSeries, DatedValue, Ticker};
use serde::{Deserialize, Serialize};

/// Spans shorter than this many days get 2-decimal percentage ticks.
pub const SHORT_SPAN_DAYS: i64 = 30;

/// Percentage axis tick format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickFormat {
    pub decimals: u8,
}

impl TickFormat {
    /// 2 decimals under [`SHORT_SPAN_DAYS`], 0 otherwise.
    pub fn for_span(span_days: i64) -> Self {
        let decimals = if span_days < SHORT_SPAN_DAYS { 2 } else { 0 };
        Self { decimals }
    }

    /// d3-format string as used by plotly (`.2%`, `.0%`).
    pub fn d3_format(&self) -> String {
        format!(".{}%", self.decimals)
    }

    /// Format a fractional value as a percentage tick label.
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.*}%", self.decimals as usize, value * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTrace {
    pub ticker: Ticker,
    /// Legend text, e.g. `AAPL (123.45%)`.
    pub label: String,
    pub points: Vec<DatedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartModel {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub legend_title: String,
    pub span_days: i64,
    pub tick_format: TickFormat,
    pub traces: Vec<ChartTrace>,
}

pub fn legend_label(ticker: &Ticker, cumulative_return_pct: f64) -> String {
    format!("{ticker} ({cumulative_return_pct:.2}%)")
}

/// Build the chart in rank order.
///
/// `span_days` is latest end minus earliest start across the aligned dataset.
/// Ranked tickers missing from `annotated` get no trace.
pub fn build_chart(
    title: &str,
    ranked: &[RankedStatistics],
    annotated: &[(Ticker, AnnotatedSeries)],
    span_days: i64,
) -> ChartModel {
    let traces = ranked
        .iter()
        .filter_map(|r| {
            annotated
                .iter()
                .find(|(t, _)| *t == r.ticker)
                .map(|(_, a)| ChartTrace {
                    ticker: r.ticker.clone(),
                    label: legend_label(&r.ticker, r.statistics.cumulative_return_pct),
                    points: a.cumulative.clone(),
                })
        })
        .collect();

    ChartModel {
        title: title.to_string(),
        x_axis_title: "Date".into(),
        y_axis_title: "Return".into(),
        legend_title: "Assets".into(),
        span_days,
        tick_format: TickFormat::for_span(span_days),
        traces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_statistics;
    use crate::ranking::rank_by_cumulative_return;
    use assetlens_core::domain::{PriceField, PricePoint, TimeSeries};
    use chrono::NaiveDate;

    fn t(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    fn annotated(prices: &[f64]) -> AnnotatedSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(start + chrono::Duration::days(i as i64), *p))
            .collect();
        TimeSeries::new(PriceField::AdjustedClose, points)
            .unwrap()
            .annotate()
    }

    #[test]
    fn tick_format_threshold() {
        assert_eq!(TickFormat::for_span(0).decimals, 2);
        assert_eq!(TickFormat::for_span(29).decimals, 2);
        assert_eq!(TickFormat::for_span(30).decimals, 0);
        assert_eq!(TickFormat::for_span(3650).d3_format(), ".0%");
        assert_eq!(TickFormat::for_span(5).d3_format(), ".2%");
    }

    #[test]
    fn tick_value_formatting() {
        assert_eq!(TickFormat { decimals: 2 }.format_value(0.1234), "12.34%");
        assert_eq!(TickFormat { decimals: 0 }.format_value(-0.5), "-50%");
    }

    #[test]
    fn legend_label_two_decimals() {
        assert_eq!(legend_label(&t("AAPL"), 123.456), "AAPL (123.46%)");
        assert_eq!(legend_label(&t("BTC-USD"), -7.0), "BTC-USD (-7.00%)");
    }

    #[test]
    fn traces_follow_rank_order() {
        let series = vec![
            (t("SLOW"), annotated(&[100.0, 101.0, 102.0])),
            (t("FAST"), annotated(&[100.0, 120.0, 150.0])),
        ];
        let records = series
            .iter()
            .map(|(tk, a)| (tk.clone(), compute_statistics(a).unwrap()))
            .collect();
        let ranked = rank_by_cumulative_return(records);

        let chart = build_chart("Cumulative Returns", &ranked, &series, 2);
        let order: Vec<&str> = chart.traces.iter().map(|tr| tr.ticker.as_str()).collect();
        assert_eq!(order, vec!["FAST", "SLOW"]);
        assert_eq!(chart.traces[0].label, "FAST (50.00%)");
        assert_eq!(chart.traces[0].points.len(), 3);
        assert_eq!(chart.tick_format.decimals, 2);
        assert_eq!(chart.y_axis_title, "Return");
    }
}
