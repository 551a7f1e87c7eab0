//! AssetLens Runner — statistics, ranking, correlation, chart model and reports.
//!
//! This crate builds on `assetlens-core` to provide:
//! - Request resolution and TOML configuration
//! - Per-ticker descriptive statistics
//! - Ranking by cumulative return
//! - Correlation of daily returns over an explicit inner join
//! - A renderer-neutral cumulative-return chart model
//! - The analysis pipeline and JSON/CSV/Markdown artifacts

pub mod chart;
pub mod config;
pub mod correlation;
pub mod export;
pub mod metrics;
pub mod pipeline;
pub mod ranking;
pub mod request;

pub use chart::{build_chart, ChartModel, ChartTrace, TickFormat};
pub use config::{AnalysisConfig, ConfigError, SourceConfig};
pub use correlation::{correlation_matrix, CorrelationError, CorrelationMatrix, FieldFilter};
pub use export::{load_artifacts, save_artifacts};
pub use metrics::{compute_statistics, StatisticsError, StatisticsRecord};
pub use pipeline::{
    analyze_dataset, run_analysis, AnalysisReport, PipelineError, SkipStage, SkippedTicker,
    SCHEMA_VERSION,
};
pub use ranking::{rank_by_cumulative_return, RankedStatistics};
pub use request::{AlignmentChoice, AnalysisRequest, RequestError, RequestInput};
