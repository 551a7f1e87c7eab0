//! TickerDataset — the per-request collection of price series.

use super::series::TimeSeries;
use super::ticker::Ticker;
use chrono::NaiveDate;

/// Ticker → series mapping that remembers insertion (input) order.
///
/// Ticker keys are unique. Inserting an existing ticker replaces its series
/// in place without changing its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerDataset {
    entries: Vec<(Ticker, TimeSeries)>,
}

impl TickerDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: Ticker, series: TimeSeries) {
        match self.entries.iter_mut().find(|(t, _)| *t == ticker) {
            Some(entry) => entry.1 = series,
            None => self.entries.push((ticker, series)),
        }
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&TimeSeries> {
        self.entries
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, s)| s)
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.get(ticker).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tickers in input order.
    pub fn tickers(&self) -> Vec<Ticker> {
        self.entries.iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, &TimeSeries)> {
        self.entries.iter().map(|(t, s)| (t, s))
    }

    /// Position of a ticker in input order.
    pub fn position(&self, ticker: &Ticker) -> Option<usize> {
        self.entries.iter().position(|(t, _)| t == ticker)
    }

    /// Earliest first date across all non-empty series.
    pub fn earliest_start(&self) -> Option<NaiveDate> {
        self.entries.iter().filter_map(|(_, s)| s.first_date()).min()
    }

    /// Latest last date across all non-empty series.
    pub fn latest_end(&self) -> Option<NaiveDate> {
        self.entries.iter().filter_map(|(_, s)| s.last_date()).max()
    }

    /// Drop tickers whose series is empty.
    pub fn without_empty(self) -> Self {
        Self {
            entries: self
                .entries
                .into_iter()
                .filter(|(_, s)| !s.is_empty())
                .collect(),
        }
    }
}

impl FromIterator<(Ticker, TimeSeries)> for TickerDataset {
    fn from_iter<I: IntoIterator<Item = (Ticker, TimeSeries)>>(iter: I) -> Self {
        let mut dataset = TickerDataset::new();
        for (ticker, series) in iter {
            dataset.insert(ticker, series);
        }
        dataset
    }
}

impl IntoIterator for TickerDataset {
    type Item = (Ticker, TimeSeries);
    type IntoIter = std::vec::IntoIter<(Ticker, TimeSeries)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{PriceField, PricePoint};

    fn series(start: (i32, u32, u32), n: usize) -> TimeSeries {
        let first = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
        let points = (0..n)
            .map(|i| PricePoint::new(first + chrono::Duration::days(i as i64), 100.0 + i as f64))
            .collect();
        TimeSeries::new(PriceField::Close, points).unwrap()
    }

    fn t(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    #[test]
    fn preserves_insertion_order() {
        let ds: TickerDataset = vec![
            (t("MSFT"), series((2024, 1, 1), 3)),
            (t("AAPL"), series((2024, 1, 1), 3)),
            (t("SPY"), series((2024, 1, 1), 3)),
        ]
        .into_iter()
        .collect();
        let order: Vec<String> = ds.tickers().into_iter().map(String::from).collect();
        assert_eq!(order, vec!["MSFT", "AAPL", "SPY"]);
        assert_eq!(ds.position(&t("SPY")), Some(2));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut ds = TickerDataset::new();
        ds.insert(t("A"), series((2024, 1, 1), 3));
        ds.insert(t("B"), series((2024, 1, 1), 3));
        ds.insert(t("A"), series((2024, 1, 1), 5));
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.position(&t("A")), Some(0));
        assert_eq!(ds.get(&t("A")).unwrap().len(), 5);
    }

    #[test]
    fn date_bounds_span_all_series() {
        let mut ds = TickerDataset::new();
        ds.insert(t("A"), series((2020, 1, 1), 10));
        ds.insert(t("B"), series((2021, 1, 1), 10));
        assert_eq!(ds.earliest_start(), NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(ds.latest_end(), NaiveDate::from_ymd_opt(2021, 1, 10));
    }

    #[test]
    fn without_empty_drops_only_empty() {
        let mut ds = TickerDataset::new();
        ds.insert(t("A"), series((2020, 1, 1), 2));
        ds.insert(t("B"), series((2020, 1, 1), 0));
        let ds = ds.without_empty();
        assert_eq!(ds.len(), 1);
        assert!(ds.contains(&t("A")));
        assert!(!ds.contains(&t("B")));
    }
}
