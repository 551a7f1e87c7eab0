//! Synthetic provider for offline runs and tests.
//!
//! Produces a deterministic random walk per symbol, seeded by the BLAKE3 hash
//! of the symbol. Weekends are skipped. With `FetchWindow::Max` each symbol
//! starts in a different year (2000..2020), which exercises alignment.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, FetchWindow, RawBar};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SyntheticProvider {
    end: NaiveDate,
}

impl SyntheticProvider {
    /// Provider whose history ends at `end` (inclusive).
    pub fn new(end: NaiveDate) -> Self {
        Self { end }
    }

    /// Provider whose history ends today.
    pub fn ending_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    /// First date of the full history for `symbol`.
    pub fn history_start(symbol: &str) -> NaiveDate {
        let hash = blake3::hash(symbol.as_bytes());
        let year = 2000 + i32::from(hash.as_bytes()[0] % 20);
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Generate bars for `symbol` over its full history, then cut to `window`.
    ///
    /// The walk always starts at `history_start`, so the same date gets the
    /// same price no matter which window was requested.
    pub fn generate(&self, symbol: &str, window: FetchWindow) -> Vec<RawBar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = 100.0_f64;
        let mut current = Self::history_start(symbol);

        while current <= self.end {
            let weekday = current.weekday();
            if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.0305);
            price *= 1.0 + daily_return;
            let volume = rng.gen_range(500_000..5_000_000u64);

            if window.contains(current) {
                bars.push(RawBar {
                    date: current,
                    close: Some(price),
                    adj_close: Some(price * 0.98),
                    volume: Some(volume),
                });
            }
            current += chrono::Duration::days(1);
        }

        bars
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&self, symbol: &str, window: FetchWindow) -> Result<FetchResult, DataError> {
        let bars = self.generate(symbol, window);
        if bars.is_empty() {
            return Err(DataError::EmptySeries {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SyntheticProvider {
        SyntheticProvider::new(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
    }

    fn january() -> FetchWindow {
        FetchWindow::Between {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        }
    }

    #[test]
    fn synthetic_data_is_deterministic() {
        let bars1 = provider().generate("SPY", january());
        let bars2 = provider().generate("SPY", january());
        assert_eq!(bars1, bars2);
    }

    #[test]
    fn different_symbols_get_different_data() {
        let spy = provider().generate("SPY", january());
        let qqq = provider().generate("QQQ", january());
        assert_eq!(spy.len(), qqq.len());
        assert_ne!(spy[0].close, qqq[0].close);
    }

    #[test]
    fn skips_weekends() {
        let bars = provider().generate("SPY", january());
        // January 2024 has 23 weekdays
        assert_eq!(bars.len(), 23);
        assert!(bars
            .iter()
            .all(|b| !matches!(b.date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)));
    }

    #[test]
    fn window_does_not_change_prices() {
        let full = provider().generate("SPY", FetchWindow::Max);
        let jan = provider().generate("SPY", january());
        let first_jan = full.iter().find(|b| b.date == jan[0].date).unwrap();
        assert_eq!(first_jan.close, jan[0].close);
    }

    #[test]
    fn max_window_starts_at_history_start() {
        let bars = provider().generate("AAPL", FetchWindow::Max);
        let start = SyntheticProvider::history_start("AAPL");
        assert!(bars[0].date >= start);
        assert!(bars[0].date < start + chrono::Duration::days(4));
        assert!((2000..2020).contains(&start.year()));
    }

    #[test]
    fn window_before_history_is_empty() {
        let window = FetchWindow::Between {
            start: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(1990, 12, 31).unwrap(),
        };
        let err = provider().fetch("SPY", window).unwrap_err();
        assert!(err.is_not_found());
    }
}
