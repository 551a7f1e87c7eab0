//! AssetLens CLI — analyze asset returns from the command line.
//!
//! Commands:
//! - `analyze` — fetch prices, compute statistics, rank, correlate, print, save artifacts
//! - `show` — print a previously saved artifact directory

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use assetlens_core::data::{CsvProvider, DataProvider, SyntheticProvider, YahooProvider};
use assetlens_runner::config::{AnalysisConfig, SourceConfig};
use assetlens_runner::pipeline::{run_analysis, AnalysisReport};
use assetlens_runner::request::{AlignmentChoice, AnalysisRequest};
use assetlens_runner::{load_artifacts, save_artifacts, FieldFilter, StatisticsRecord};

#[derive(Parser)]
#[command(
    name = "assetlens",
    about = "AssetLens CLI — compare historical returns across assets"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices and analyze a list of tickers.
    Analyze(AnalyzeArgs),
    /// Print a saved report from an artifact directory.
    Show {
        /// Directory created by `analyze --output-dir`.
        dir: PathBuf,
    },
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Comma-separated tickers (e.g., "AAPL, MSFT, BTC-USD").
    #[arg(long)]
    tickers: Option<String>,

    /// Alignment: all, earliest-common or custom.
    #[arg(long)]
    align: Option<AlignmentChoice>,

    /// Custom range start (YYYY-MM-DD). Defaults to January 1 of this year.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Custom range end (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// TOML config file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Price source.
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Directory of {TICKER}.csv files (implies --source csv).
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Save report artifacts under this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip ticker description lookups.
    #[arg(long, default_value_t = false)]
    no_describe: bool,

    /// Price field eligible for correlation: adjusted-close, close or any.
    #[arg(long)]
    correlation_field: Option<FieldFilter>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceKind {
    Yahoo,
    Csv,
    Synthetic,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Show { dir } => {
            let report = load_artifacts(&dir)?;
            print_report(&report);
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    // File values first, then flag overrides
    let mut input = config.request_input()?;
    if let Some(tickers) = args.tickers {
        input.tickers = tickers;
    }
    if let Some(align) = args.align {
        input.alignment = align;
    }
    if args.start.is_some() {
        input.start = args.start;
    }
    if args.end.is_some() {
        input.end = args.end;
    }
    if let Some(field) = args.correlation_field {
        input.correlation_field = field;
    }
    if args.no_describe {
        input.describe = false;
    }

    let today = chrono::Local::now().date_naive();
    let request = AnalysisRequest::resolve(input, today).context("invalid analysis request")?;

    let source = resolve_source(args.source, args.csv_dir, config.source)?;
    let report = match source {
        SourceConfig::Yahoo => {
            let provider = YahooProvider::new()?;
            run_analysis(request, &provider, Some(&provider))?
        }
        SourceConfig::Csv { dir } => {
            let provider = CsvProvider::new(dir);
            if !provider.is_available() {
                bail!("CSV directory does not exist: {}", provider.dir().display());
            }
            run_analysis(request, &provider, None)?
        }
        SourceConfig::Synthetic { end } => {
            let provider = SyntheticProvider::new(end.unwrap_or(today));
            run_analysis(request, &provider, None)?
        }
    };

    print_report(&report);

    if let Some(dir) = args.output_dir.or(config.output_dir) {
        let run_dir = save_artifacts(&report, &dir)?;
        info!(dir = %run_dir.display(), "artifacts saved");
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

/// Pick the price source: `--source` flag, then `--csv-dir`, then the config file, then Yahoo.
fn resolve_source(
    flag: Option<SourceKind>,
    csv_dir: Option<PathBuf>,
    from_config: Option<SourceConfig>,
) -> Result<SourceConfig> {
    let config_dir = match &from_config {
        Some(SourceConfig::Csv { dir }) => Some(dir.clone()),
        _ => None,
    };
    let config_end = match &from_config {
        Some(SourceConfig::Synthetic { end }) => *end,
        _ => None,
    };

    Ok(match (flag, csv_dir) {
        (Some(SourceKind::Yahoo), _) => SourceConfig::Yahoo,
        (Some(SourceKind::Synthetic), _) => SourceConfig::Synthetic { end: config_end },
        (Some(SourceKind::Csv), Some(dir)) | (None, Some(dir)) => SourceConfig::Csv { dir },
        (Some(SourceKind::Csv), None) => match config_dir {
            Some(dir) => SourceConfig::Csv { dir },
            None => bail!("--source csv needs --csv-dir (or [source] dir in the config file)"),
        },
        (None, None) => from_config.unwrap_or(SourceConfig::Yahoo),
    })
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_report(report: &AnalysisReport) {
    println!();
    println!("=== Asset Returns ===");
    println!("Provider:       {}", report.provider);
    println!("Alignment:      {}", report.request.alignment.label());
    println!("Dataset Hash:   {}", report.dataset_hash);
    println!();

    print_statistics(report);
    print_correlation(report);
    print_chart(report);

    if !report.descriptions.is_empty() {
        println!("--- Descriptions ---");
        for d in &report.descriptions {
            println!("{:<10} {}", d.ticker.as_str(), d.description);
        }
        println!();
    }

    for s in &report.skipped {
        println!("SKIPPED: {} ({:?}): {}", s.ticker, s.stage, s.reason);
    }
    if !report.skipped.is_empty() {
        println!();
    }
}

fn print_statistics(report: &AnalysisReport) {
    println!("--- Statistics ---");
    if report.statistics.is_empty() {
        println!("No ticker had enough data for statistics.");
        println!();
        return;
    }

    print!("{:<24}", "");
    for r in &report.statistics {
        print!("{:>14}", format!("#{} {}", r.rank, r.ticker));
    }
    println!();
    println!("{}", "-".repeat(24 + 14 * report.statistics.len()));

    let columns: Vec<[String; 9]> = report
        .statistics
        .iter()
        .map(|r| r.statistics.display_values())
        .collect();
    for (row, label) in StatisticsRecord::LABELS.iter().enumerate() {
        print!("{label:<24}");
        for c in &columns {
            print!("{:>14}", c[row]);
        }
        println!();
    }
    println!();
}

fn print_correlation(report: &AnalysisReport) {
    match (&report.correlation, &report.correlation_note) {
        (Some(m), _) => {
            println!("--- Correlation of Daily Returns ({} days) ---", m.joined_rows);
            print!("{:<10}", "");
            for t in &m.tickers {
                print!("{:>10}", t.as_str());
            }
            println!();
            for (t, row) in m.tickers.iter().zip(&m.values) {
                print!("{:<10}", t.as_str());
                for v in row {
                    match v {
                        Some(x) => print!("{x:>10.4}"),
                        None => print!("{:>10}", "n/a"),
                    }
                }
                println!();
            }
            println!();
        }
        (None, Some(note)) => {
            println!("--- Correlation of Daily Returns ---");
            println!("Not computed: {note}");
            println!();
        }
        (None, None) => {}
    }
}

fn print_chart(report: &AnalysisReport) {
    let chart = &report.chart;
    println!("--- {} ---", chart.title);
    println!(
        "Span: {} days, y-axis ticks {}",
        chart.span_days,
        chart.tick_format.d3_format()
    );
    for trace in &chart.traces {
        let last = trace
            .points
            .last()
            .map(|p| format!("{} on {}", chart.tick_format.format_value(p.value), p.date))
            .unwrap_or_default();
        println!("  {:<24} {last}", trace.label);
    }
    println!();
}
