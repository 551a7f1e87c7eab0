//! Property tests for domain and alignment invariants.
//!
//! Uses proptest to verify:
//! 1. Ticker list parsing — no blanks, no duplicates, first-occurrence order
//! 2. Earliest common date — every output series starts at the max of the input starts
//! 3. Custom range — every output observation lies inside the range
//! 4. Cumulative return — starts at 0 and tracks price / first price

use assetlens_core::data::{align, AlignmentPolicy, DateRange};
use assetlens_core::domain::{parse_ticker_list, PriceField, PricePoint, Ticker, TickerDataset, TimeSeries};
use chrono::NaiveDate;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

/// A series starting `offset` days after the base date with `len` daily points.
fn arb_series() -> impl Strategy<Value = TimeSeries> {
    (0..400i64, 1..200usize, prop::collection::vec(1.0..500.0_f64, 200)).prop_map(
        |(offset, len, prices)| {
            let start = base_date() + chrono::Duration::days(offset);
            let points = prices
                .into_iter()
                .take(len)
                .enumerate()
                .map(|(i, p)| PricePoint::new(start + chrono::Duration::days(i as i64), p))
                .collect();
            TimeSeries::new(PriceField::AdjustedClose, points).unwrap()
        },
    )
}

fn arb_dataset() -> impl Strategy<Value = TickerDataset> {
    prop::collection::vec(arb_series(), 1..6).prop_map(|series| {
        series
            .into_iter()
            .enumerate()
            .map(|(i, s)| (Ticker::new(&format!("T{i}")).unwrap(), s))
            .collect()
    })
}

// ── 1. Ticker parsing ────────────────────────────────────────────────

proptest! {
    #[test]
    fn parsed_tickers_are_unique_and_ordered(
        symbols in prop::collection::vec("[a-zA-Z]{1,5}", 0..12),
        pad in prop::collection::vec(" {0,2}", 12),
    ) {
        let input = symbols
            .iter()
            .zip(pad.iter())
            .map(|(s, p)| format!("{p}{s}{p}"))
            .collect::<Vec<_>>()
            .join(",");
        let parsed = parse_ticker_list(&input).unwrap();

        let mut expected: Vec<String> = Vec::new();
        for s in &symbols {
            let upper = s.to_uppercase();
            if !expected.contains(&upper) {
                expected.push(upper);
            }
        }
        let got: Vec<String> = parsed.iter().map(|t| t.to_string()).collect();
        prop_assert_eq!(got, expected);
    }
}

// ── 2. Earliest common date ──────────────────────────────────────────

proptest! {
    #[test]
    fn earliest_common_start_is_max_of_starts(ds in arb_dataset()) {
        let common = ds.iter().filter_map(|(_, s)| s.first_date()).max().unwrap();
        match align(ds.clone(), &AlignmentPolicy::EarliestCommonDate) {
            Ok(aligned) => {
                for (ticker, series) in aligned.iter() {
                    prop_assert!(series.first_date().unwrap() >= common);
                    // A series that covers the common start keeps it exactly
                    let original = ds.get(ticker).unwrap();
                    if original.points().iter().any(|p| p.date == common) {
                        prop_assert_eq!(series.first_date(), Some(common));
                    }
                }
                // The ticker that defined the common start always survives
                prop_assert!(aligned.iter().any(|(_, s)| s.first_date() == Some(common)));
            }
            Err(e) => prop_assert!(false, "earliest common never empties the ticker that defines it: {e}"),
        }
    }
}

// ── 3. Custom range ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn custom_range_bounds_every_observation(
        ds in arb_dataset(),
        a in 0..600i64,
        b in 0..600i64,
    ) {
        let start = base_date() + chrono::Duration::days(a.min(b));
        let end = base_date() + chrono::Duration::days(a.max(b));
        let range = DateRange::new(start, end).unwrap();
        if let Ok(aligned) = align(ds, &AlignmentPolicy::CustomRange(Some(range))) {
            for (_, series) in aligned.iter() {
                prop_assert!(!series.is_empty());
                for p in series.points() {
                    prop_assert!(p.date >= start && p.date <= end);
                }
            }
        }
    }
}

// ── 4. Cumulative return ─────────────────────────────────────────────

proptest! {
    #[test]
    fn cumulative_return_tracks_first_price(series in arb_series()) {
        let prices = series.prices();
        let annotated = series.annotate();
        prop_assert_eq!(annotated.cumulative.len(), prices.len());
        prop_assert_eq!(annotated.cumulative[0].value, 0.0);
        for (c, p) in annotated.cumulative.iter().zip(prices.iter()) {
            prop_assert!((c.value - (p / prices[0] - 1.0)).abs() < 1e-12);
        }
    }
}
