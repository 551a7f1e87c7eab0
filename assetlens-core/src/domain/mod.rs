//! Domain types for AssetLens

pub mod dataset;
pub mod series;
pub mod ticker;

pub use dataset::TickerDataset;
pub use series::{AnnotatedSeries, DatedValue, PriceField, PricePoint, SeriesError, TimeSeries};
pub use ticker::{parse_ticker_list, Ticker, TickerError};
