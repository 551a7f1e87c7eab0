//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: the full `AnalysisReport`, with schema versioning
//! - **CSV**: statistics table, correlation matrix and long-format cumulative returns
//! - **Markdown**: human-readable summary of one analysis run
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::chart::ChartModel;
use crate::correlation::CorrelationMatrix;
use crate::metrics::StatisticsRecord;
use crate::pipeline::{AnalysisReport, SCHEMA_VERSION};
use crate::ranking::RankedStatistics;

/// Top-left cell of the correlation CSV.
pub const CORRELATION_CORNER: &str = "Correlation Matrix";

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Statistics table with one column per ticker (rank order) and one row per statistic.
pub fn export_statistics_csv(ranked: &[RankedStatistics]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["Statistic".to_string()];
    header.extend(ranked.iter().map(|r| r.ticker.to_string()));
    wtr.write_record(&header)?;

    let columns: Vec<[String; 9]> = ranked
        .iter()
        .map(|r| r.statistics.display_values())
        .collect();
    for (row, label) in StatisticsRecord::LABELS.iter().enumerate() {
        let mut record = vec![label.to_string()];
        record.extend(columns.iter().map(|c| c[row].clone()));
        wtr.write_record(&record)?;
    }

    finish_csv(wtr)
}

/// Square correlation matrix. Undefined coefficients are empty cells.
pub fn export_correlation_csv(matrix: &CorrelationMatrix) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![CORRELATION_CORNER.to_string()];
    header.extend(matrix.tickers.iter().map(|t| t.to_string()));
    wtr.write_record(&header)?;

    for (ticker, row) in matrix.tickers.iter().zip(&matrix.values) {
        let mut record = vec![ticker.to_string()];
        record.extend(
            row.iter()
                .map(|v| v.map(|x| format!("{x:.4}")).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }

    finish_csv(wtr)
}

/// Chart traces in long format: ticker, date, cumulative_return.
pub fn export_chart_csv(chart: &ChartModel) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["ticker", "date", "cumulative_return"])?;
    for trace in &chart.traces {
        for point in &trace.points {
            wtr.write_record([
                trace.ticker.as_str(),
                &point.date.to_string(),
                &format!("{:.6}", point.value),
            ])?;
        }
    }
    finish_csv(wtr)
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one analysis run.
///
/// Creates `analysis_{timestamp}/` under `output_dir` containing:
/// - `report.json` — the full `AnalysisReport`
/// - `statistics.csv`
/// - `correlation.csv` (only when a matrix was computed)
/// - `cumulative_returns.csv`
/// - `report.md`
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("analysis_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_artifact(&run_dir, "report.json", &export_json(report)?)?;
    write_artifact(
        &run_dir,
        "statistics.csv",
        &export_statistics_csv(&report.statistics)?,
    )?;
    if let Some(ref matrix) = report.correlation {
        write_artifact(&run_dir, "correlation.csv", &export_correlation_csv(matrix)?)?;
    }
    write_artifact(
        &run_dir,
        "cumulative_returns.csv",
        &export_chart_csv(&report.chart)?,
    )?;
    write_artifact(&run_dir, "report.md", &generate_report(report))?;

    Ok(run_dir)
}

fn write_artifact(dir: &Path, name: &str, content: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Load an `AnalysisReport` from an artifact directory's report.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<AnalysisReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for one analysis run.
pub fn generate_report(report: &AnalysisReport) -> String {
    let mut md = String::with_capacity(4096);

    md.push_str("# Asset Returns Report\n\n");

    // Metadata
    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Generated | {} |\n", report.generated_at));
    md.push_str(&format!("| Provider | {} |\n", report.provider));
    md.push_str(&format!(
        "| Alignment | {} |\n",
        report.request.alignment.label()
    ));
    md.push_str(&format!(
        "| Correlation Field | {} |\n",
        report.request.correlation_field
    ));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    md.push('\n');

    // Statistics
    md.push_str("## Statistics\n\n");
    if report.statistics.is_empty() {
        md.push_str("No ticker had enough data for statistics.\n\n");
    } else {
        md.push_str("| Statistic |");
        for r in &report.statistics {
            md.push_str(&format!(" {} |", r.ticker));
        }
        md.push('\n');
        md.push_str("| --- |");
        for _ in &report.statistics {
            md.push_str(" ---: |");
        }
        md.push('\n');

        let columns: Vec<[String; 9]> = report
            .statistics
            .iter()
            .map(|r| r.statistics.display_values())
            .collect();
        for (row, label) in StatisticsRecord::LABELS.iter().enumerate() {
            md.push_str(&format!("| {label} |"));
            for c in &columns {
                md.push_str(&format!(" {} |", c[row]));
            }
            md.push('\n');
        }
        md.push('\n');
    }

    // Correlation
    if let Some(ref m) = report.correlation {
        md.push_str("## Correlation of Daily Returns\n\n");
        md.push_str(&format!("Joined on {} common dates.\n\n", m.joined_rows));
        md.push_str("| |");
        for t in &m.tickers {
            md.push_str(&format!(" {t} |"));
        }
        md.push('\n');
        md.push_str("| --- |");
        for _ in &m.tickers {
            md.push_str(" ---: |");
        }
        md.push('\n');
        for (t, row) in m.tickers.iter().zip(&m.values) {
            md.push_str(&format!("| {t} |"));
            for v in row {
                match v {
                    Some(x) => md.push_str(&format!(" {x:.4} |")),
                    None => md.push_str(" n/a |"),
                }
            }
            md.push('\n');
        }
        md.push('\n');
    } else if let Some(ref note) = report.correlation_note {
        md.push_str("## Correlation of Daily Returns\n\n");
        md.push_str(&format!("Not computed: {note}\n\n"));
    }

    // Chart
    md.push_str(&format!("## {}\n\n", report.chart.title));
    md.push_str(&format!(
        "Span: {} days, tick format `{}`.\n\n",
        report.chart.span_days,
        report.chart.tick_format.d3_format()
    ));
    for trace in &report.chart.traces {
        md.push_str(&format!("- {} ({} points)\n", trace.label, trace.points.len()));
    }
    md.push('\n');

    // Descriptions
    if !report.descriptions.is_empty() {
        md.push_str("## Descriptions\n\n");
        for d in &report.descriptions {
            md.push_str(&format!("- **{}**: {}\n", d.ticker, d.description));
        }
        md.push('\n');
    }

    // Skipped
    if !report.skipped.is_empty() {
        md.push_str("## Skipped Tickers\n\n");
        md.push_str("| Ticker | Stage | Reason |\n");
        md.push_str("| --- | --- | --- |\n");
        for s in &report.skipped {
            md.push_str(&format!(
                "| {} | {:?} | {} |\n",
                s.ticker, s.stage, s.reason
            ));
        }
        md.push('\n');
    }

    md
}
