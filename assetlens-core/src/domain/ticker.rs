//! Ticker symbols and free-text ticker list parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A normalized ticker symbol: trimmed and upper-cased.
///
/// Provider-specific punctuation (`^SP500TR`, `BTC-USD`, `BRK.B`) is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    #[error("ticker is empty")]
    Empty,

    #[error("ticker '{0}' contains whitespace or a comma")]
    InvalidCharacter(String),

    #[error("ticker '{0}' contains a path separator")]
    PathSeparator(String),
}

impl Ticker {
    pub fn new(raw: &str) -> Result<Self, TickerError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TickerError::Empty);
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c == ',') {
            return Err(TickerError::InvalidCharacter(trimmed.to_string()));
        }
        // symbols double as file stems for the CSV provider
        if trimmed.contains(['/', '\\']) || trimmed.chars().all(|c| c == '.') {
            return Err(TickerError::PathSeparator(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ticker::new(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse a comma-separated ticker list (e.g. `"aapl, MSFT,,btc-usd"`).
///
/// Blank entries are dropped and duplicates are removed, keeping the first
/// occurrence so the input order survives for ranking ties.
pub fn parse_ticker_list(input: &str) -> Result<Vec<Ticker>, TickerError> {
    let mut tickers: Vec<Ticker> = Vec::new();
    for part in input.split(',') {
        if part.trim().is_empty() {
            continue;
        }
        let ticker = Ticker::new(part)?;
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_is_trimmed_and_uppercased() {
        let t = Ticker::new("  btc-usd ").unwrap();
        assert_eq!(t.as_str(), "BTC-USD");
    }

    #[test]
    fn empty_ticker_rejected() {
        assert_eq!(Ticker::new("   "), Err(TickerError::Empty));
    }

    #[test]
    fn inner_whitespace_rejected() {
        assert!(matches!(
            Ticker::new("AA PL"),
            Err(TickerError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn path_like_tickers_rejected() {
        for raw in ["../etc/passwd", "a/b", "..\\x", "..", "."] {
            assert_eq!(
                Ticker::new(raw),
                Err(TickerError::PathSeparator(raw.to_string())),
                "{raw}"
            );
        }
        assert_eq!(Ticker::new("brk.b").unwrap().as_str(), "BRK.B");
    }

    #[test]
    fn list_drops_blanks_and_duplicates() {
        let tickers = parse_ticker_list("aapl, MSFT,, ,AAPL,^sp500tr").unwrap();
        let symbols: Vec<&str> = tickers.iter().map(|t| t.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT", "^SP500TR"]);
    }

    #[test]
    fn empty_input_gives_empty_list() {
        assert!(parse_ticker_list("").unwrap().is_empty());
        assert!(parse_ticker_list(" , ,").unwrap().is_empty());
    }

    #[test]
    fn ticker_serde_normalizes() {
        let t: Ticker = serde_json::from_str("\"spy\"").unwrap();
        assert_eq!(t.as_str(), "SPY");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"SPY\"");
    }
}
