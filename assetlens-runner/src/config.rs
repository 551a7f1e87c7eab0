//! TOML analysis configuration.
//!
//! Every field is optional; command-line flags fill in or override whatever
//! the file leaves out. Dates are quoted strings (`start = "2024-01-01"`).
//!
//! ```toml
//! tickers = ["AAPL", "MSFT", "BTC-USD"]
//! describe = true
//! output_dir = "reports"
//!
//! [alignment]
//! policy = "custom"
//! start = "2020-01-01"
//!
//! [source]
//! kind = "csv"
//! dir = "data/prices"
//!
//! [correlation]
//! field = "any"
//! ```

use crate::correlation::FieldFilter;
use crate::request::{AlignmentChoice, RequestInput};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Ticker list as either one comma-separated string or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TickerList {
    Text(String),
    List(Vec<String>),
}

impl TickerList {
    /// Comma-joined form, as accepted by ticker list parsing.
    pub fn joined(&self) -> String {
        match self {
            TickerList::Text(s) => s.clone(),
            TickerList::List(v) => v.join(","),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlignmentConfig {
    pub policy: Option<AlignmentChoice>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Where prices come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceConfig {
    Yahoo,
    Csv { dir: PathBuf },
    Synthetic { end: Option<NaiveDate> },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorrelationConfig {
    /// `adjusted-close` (default), `close` or `any`.
    pub field: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    pub tickers: Option<TickerList>,
    #[serde(default)]
    pub alignment: AlignmentConfig,
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub correlation: CorrelationConfig,
    pub describe: Option<bool>,
    pub output_dir: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.correlation_filter()?;
        Ok(config)
    }

    pub fn correlation_filter(&self) -> Result<Option<FieldFilter>, ConfigError> {
        self.correlation
            .field
            .as_deref()
            .map(|f| f.parse::<FieldFilter>().map_err(ConfigError::Invalid))
            .transpose()
    }

    /// Request input from the file alone. Descriptions default to on.
    pub fn request_input(&self) -> Result<RequestInput, ConfigError> {
        Ok(RequestInput {
            tickers: self.tickers.as_ref().map(TickerList::joined).unwrap_or_default(),
            alignment: self.alignment.policy.unwrap_or_default(),
            start: self.alignment.start,
            end: self.alignment.end,
            correlation_field: self.correlation_filter()?.unwrap_or_default(),
            describe: self.describe.unwrap_or(true),
        })
    }
}
