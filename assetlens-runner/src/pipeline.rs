//! Analysis pipeline — wires acquisition, alignment, statistics, ranking,
//! correlation, chart and descriptions into one [`AnalysisReport`].
//!
//! Two entry points:
//! - `run_analysis()`: fetches through a `DataProvider`, then analyzes. Used by the CLI.
//! - `analyze_dataset()`: takes already-acquired data, no I/O besides metadata.

use assetlens_core::data::{
    acquire, align, AcquiredData, AcquisitionError, AlignmentError, DataProvider, DataSource,
    FetchWindow, MetadataProvider,
};
use assetlens_core::domain::{AnnotatedSeries, PriceField, Ticker, TickerDataset};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::chart::{build_chart, ChartModel};
use crate::correlation::{correlation_matrix, CorrelationMatrix};
use crate::metrics::compute_statistics;
use crate::ranking::{rank_by_cumulative_return, ranked_tickers, RankedStatistics};
use crate::request::AnalysisRequest;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Title of the cumulative-return chart.
pub const CHART_TITLE: &str = "Cumulative Returns";

/// Description text when the provider has no long name.
pub const NO_DESCRIPTION: &str = "No description available";

/// Fatal pipeline errors. Per-ticker problems end up in `AnalysisReport::skipped`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),
    #[error("alignment failed: {0}")]
    Alignment(#[from] AlignmentError),
}

/// Pipeline stage at which a ticker dropped out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipStage {
    Acquisition,
    Alignment,
    Statistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTicker {
    pub ticker: Ticker,
    pub stage: SkipStage,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSource {
    pub ticker: Ticker,
    pub source: DataSource,
    pub field: PriceField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerDescription {
    pub ticker: Ticker,
    pub description: String,
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: String,
    pub request: AnalysisRequest,
    pub provider: String,
    pub sources: Vec<TickerSource>,
    /// BLAKE3 over the aligned dataset.
    pub dataset_hash: String,
    /// Statistics in rank order.
    pub statistics: Vec<RankedStatistics>,
    pub skipped: Vec<SkippedTicker>,
    pub correlation: Option<CorrelationMatrix>,
    /// Why `correlation` is absent, when it was attempted and failed.
    pub correlation_note: Option<String>,
    pub chart: ChartModel,
    /// Descriptions in rank order. Empty when descriptions were not requested.
    pub descriptions: Vec<TickerDescription>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl AnalysisReport {
    /// Tickers in rank order.
    pub fn ranked_tickers(&self) -> Vec<Ticker> {
        ranked_tickers(&self.statistics)
    }
}

/// Fetch every requested ticker through `provider`, then analyze.
///
/// Always fetches the full history. A custom range is applied by alignment,
/// so a ticker with no rows inside it is dropped there rather than at
/// acquisition.
pub fn run_analysis(
    request: AnalysisRequest,
    provider: &dyn DataProvider,
    metadata: Option<&dyn MetadataProvider>,
) -> Result<AnalysisReport, PipelineError> {
    let acquired = acquire(provider, &request.tickers, FetchWindow::Max)?;
    analyze_dataset(request, provider.name(), acquired, metadata)
}

/// Analyze already-acquired data.
///
/// Fails only when alignment leaves nothing. A ticker whose statistics
/// cannot be computed is dropped from every downstream view and listed in
/// `skipped`.
pub fn analyze_dataset(
    request: AnalysisRequest,
    provider_name: &str,
    acquired: AcquiredData,
    metadata: Option<&dyn MetadataProvider>,
) -> Result<AnalysisReport, PipelineError> {
    let AcquiredData {
        dataset,
        sources,
        failures,
    } = acquired;

    let mut skipped: Vec<SkippedTicker> = failures
        .into_iter()
        .map(|(ticker, e)| SkippedTicker {
            ticker,
            stage: SkipStage::Acquisition,
            reason: e.to_string(),
        })
        .collect();

    // ── Alignment ──
    let before = dataset.tickers();
    let aligned = align(dataset, &request.alignment)?;
    for ticker in before.into_iter().filter(|t| !aligned.contains(t)) {
        warn!(ticker = %ticker, "no data inside the alignment window");
        skipped.push(SkippedTicker {
            ticker,
            stage: SkipStage::Alignment,
            reason: "no observations inside the alignment window".into(),
        });
    }
    info!(
        policy = request.alignment.label(),
        tickers = aligned.len(),
        "aligned"
    );

    let dataset_hash = compute_dataset_hash(&aligned);
    let span_days = match (aligned.earliest_start(), aligned.latest_end()) {
        (Some(start), Some(end)) => (end - start).num_days(),
        _ => 0,
    };
    let sources = sources
        .into_iter()
        .filter_map(|(ticker, source)| {
            aligned.get(&ticker).map(|s| TickerSource {
                field: s.field(),
                ticker,
                source,
            })
        })
        .collect();

    // ── Statistics ──
    let annotated: Vec<(Ticker, AnnotatedSeries)> = aligned
        .iter()
        .map(|(t, s)| (t.clone(), s.clone().annotate()))
        .collect();
    let mut records = Vec::with_capacity(annotated.len());
    for (ticker, series) in &annotated {
        match compute_statistics(series) {
            Ok(record) => records.push((ticker.clone(), record)),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "statistics skipped");
                skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    stage: SkipStage::Statistics,
                    reason: e.to_string(),
                });
            }
        }
    }

    // ── Ranking ──
    let statistics = rank_by_cumulative_return(records);
    let order = ranked_tickers(&statistics);

    // ── Correlation ──
    let (correlation, correlation_note) = if order.len() >= 2 {
        match correlation_matrix(&aligned, &order, request.correlation_field) {
            Ok(m) => (Some(m), None),
            Err(e) => {
                warn!(error = %e, "correlation skipped");
                (None, Some(e.to_string()))
            }
        }
    } else {
        (None, None)
    };

    // ── Chart ──
    let chart = build_chart(CHART_TITLE, &statistics, &annotated, span_days);

    // ── Descriptions ──
    let descriptions = match metadata {
        Some(meta) if request.describe => describe_tickers(meta, &order),
        _ => Vec::new(),
    };

    info!(
        ranked = statistics.len(),
        skipped = skipped.len(),
        correlation = correlation.is_some(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        generated_at: chrono::Local::now().to_rfc3339(),
        request,
        provider: provider_name.to_string(),
        sources,
        dataset_hash,
        statistics,
        skipped,
        correlation,
        correlation_note,
        chart,
        descriptions,
    })
}

/// Look up a long name for every ticker, in the given order.
///
/// Failures never propagate. A provider with no name for the ticker yields
/// [`NO_DESCRIPTION`]; any other error becomes the description text.
pub fn describe_tickers(metadata: &dyn MetadataProvider, tickers: &[Ticker]) -> Vec<TickerDescription> {
    tickers
        .iter()
        .map(|ticker| {
            let description = match metadata.describe(ticker.as_str()) {
                Ok(name) if name.trim().is_empty() => NO_DESCRIPTION.to_string(),
                Ok(name) => name,
                Err(e) if e.is_not_found() => NO_DESCRIPTION.to_string(),
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "description lookup failed");
                    format!("Error fetching data: {e}")
                }
            };
            TickerDescription {
                ticker: ticker.clone(),
                description,
            }
        })
        .collect()
}

/// Compute a deterministic BLAKE3 hash of the aligned dataset.
///
/// The hash covers ticker, price field, dates and prices in sorted ticker
/// order, so it does not depend on input order.
pub fn compute_dataset_hash(dataset: &TickerDataset) -> String {
    let mut hasher = blake3::Hasher::new();

    let mut entries: Vec<_> = dataset.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (ticker, series) in entries {
        hasher.update(ticker.as_str().as_bytes());
        hasher.update(series.field().label().as_bytes());
        for point in series.points() {
            hasher.update(point.date.to_string().as_bytes());
            hasher.update(&point.price.to_le_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}
