use std::{collections::BTreeMap, fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ictscan::prelude::*;
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ictscan")]
#[command(author, version, about = "Price-structure pattern analysis and cross-symbol scanning")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the composite analysis over one symbol
    Analyze {
        /// Daily bars (JSON array)
        #[arg(short, long)]
        daily: PathBuf,

        /// Weekly bars (JSON array)
        #[arg(short, long)]
        weekly: Option<PathBuf>,

        /// Current price (defaults to the last daily close)
        #[arg(short, long)]
        price: Option<f64>,

        /// Analyzer config (JSON); missing fields use defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Scan many symbols for a free-text query
    Scan {
        /// JSON object mapping symbol to its daily bars
        #[arg(short, long)]
        input: PathBuf,

        /// e.g. "find 10 bullish order blocks"
        #[arg(short, long, default_value = "")]
        query: String,

        /// Scanner config (JSON); missing fields use defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Every pattern matching a query in one symbol's bars
    Chart {
        /// Daily bars (JSON array)
        #[arg(short, long)]
        bars: PathBuf,

        /// Label carried into the report
        #[arg(short, long, default_value = "")]
        symbol: String,

        #[arg(short, long, default_value = "bullish fvg")]
        query: String,

        /// Scanner config (JSON); missing fields use defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the tunable detector parameters with their bounds
    Params,
}

#[derive(Serialize)]
struct DetectorParams {
    kind: PatternKind,
    params: &'static [ParamMeta],
}

fn detector_params<D: ParameterizedDetector>() -> DetectorParams {
    DetectorParams {
        kind: D::KIND,
        params: D::param_meta(),
    }
}

fn scanner_from(config: Option<PathBuf>) -> Result<Scanner> {
    let config: ScannerConfig = match config {
        Some(path) => read_json(&path)?,
        None => ScannerConfig::default(),
    };
    Scanner::new(config).context("Invalid scanner config")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ictscan=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let output = match args.command {
        Commands::Analyze {
            daily,
            weekly,
            price,
            config,
        } => {
            let config: AnalyzerConfig = match config {
                Some(path) => read_json(&path)?,
                None => AnalyzerConfig::default(),
            };
            let analyzer = CompositeAnalyzer::new(config).context("Invalid analyzer config")?;

            let daily: BarSeries = read_json(&daily)?;
            let weekly: Option<BarSeries> = weekly.as_deref().map(read_json::<BarSeries>).transpose()?;
            info!(daily = daily.len(), weekly = weekly.as_ref().map(BarSeries::len), "analyzing");

            let verdict = analyzer
                .analyze(&daily, weekly.as_ref(), price)
                .context("Composite analysis failed")?;
            to_json(&verdict, args.compact)?
        },
        Commands::Scan { input, query, config } => {
            let scanner = scanner_from(config)?;

            let universe: BTreeMap<String, Vec<Bar>> = read_json(&input)?;
            let universe: Vec<(String, Vec<Bar>)> = universe.into_iter().collect();
            info!(symbols = universe.len(), query = %query, "scanning");

            let report = scanner.scan_text(&universe, &query).context("Scan failed")?;
            to_json(&report, args.compact)?
        },
        Commands::Chart {
            bars,
            symbol,
            query,
            config,
        } => {
            let scanner = scanner_from(config)?;
            let series: BarSeries = read_json(&bars)?;
            let query = ScanQuery::parse_with_default(&query, scanner.config().default_limit);
            info!(bars = series.len(), symbol = %symbol, query = %query.text, "analyzing chart");

            let report = scanner
                .analyze_chart(&symbol, &series, &query)
                .context("Chart analysis failed")?;
            to_json(&report, args.compact)?
        },
        Commands::Params => {
            let table = [
                detector_params::<FairValueGapDetector>(),
                detector_params::<OrderBlockDetector>(),
                detector_params::<LiquiditySweepDetector>(),
            ];
            to_json(&table, args.compact)?
        },
    };

    println!("{output}");
    Ok(())
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    json.context("Failed to serialize output")
}
