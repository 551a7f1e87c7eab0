//! Price acquisition: providers, ingest, alignment.

pub mod acquire;
pub mod align;
pub mod csv_import;
pub mod ingest;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use acquire::{acquire, AcquiredData, AcquisitionError};
pub use align::{align, common_start, AlignmentError, AlignmentPolicy, DateRange, DateRangeError};
pub use csv_import::CsvProvider;
pub use ingest::{ingest, IngestResult, IngestStats};
pub use provider::{
    DataError, DataProvider, DataSource, FetchResult, FetchWindow, MetadataProvider, RawBar,
};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
