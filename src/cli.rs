//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_report::SvgReportAdapter;
use crate::domain::config_validation::{
    exposure_params, indicator_params, parse_date, validate_config,
};
use crate::domain::error::VolscaleError;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::normalize_bars;
use crate::domain::pipeline::{run_pipeline, BacktestRun};
use crate::domain::strategy::{DataSource, StrategyConfig, ALPACA_BASE_URL};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

const DEFAULT_TIMEOUT_SECS: i64 = 30;
const DEFAULT_CSV_DIR: &str = "data";
const DEFAULT_OUTPUT_DIR: &str = "report";

#[derive(Parser, Debug)]
#[command(name = "volscale", about = "Volatility-scaled trend backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch prices, run the backtest and write reports
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Validate a configuration file without fetching data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct Overrides {
    #[arg(long)]
    pub symbol: Option<String>,
    /// Inclusive start date, YYYY-MM-DD
    #[arg(long)]
    pub start: Option<String>,
    /// Exclusive end date, YYYY-MM-DD
    #[arg(long)]
    pub end: Option<String>,
    /// Report directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Read `<dir>/<SYMBOL>.csv` instead of calling Alpaca
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest { config, overrides } => run_backtest(&config, &overrides),
        Command::Validate { config, overrides } => run_validate(&config, &overrides),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, VolscaleError> {
    FileConfigAdapter::from_file(path).map_err(|e| VolscaleError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn apply_overrides(adapter: &mut FileConfigAdapter, overrides: &Overrides) {
    if let Some(symbol) = &overrides.symbol {
        adapter.set("backtest", "symbol", symbol);
    }
    if let Some(start) = &overrides.start {
        adapter.set("backtest", "start_date", start);
    }
    if let Some(end) = &overrides.end {
        adapter.set("backtest", "end_date", end);
    }
    if let Some(output) = &overrides.output {
        adapter.set("report", "output_dir", &output.display().to_string());
    }
    if let Some(dir) = &overrides.csv_dir {
        adapter.set("data", "provider", "csv");
        adapter.set("data", "csv_dir", &dir.display().to_string());
    }
}

/// Validate `adapter` and build the run configuration from it.
pub fn build_config(adapter: &dyn ConfigPort) -> Result<StrategyConfig, VolscaleError> {
    validate_config(adapter)?;

    let symbol = adapter
        .get_string("backtest", "symbol")
        .map(|s| s.trim().to_uppercase())
        .ok_or_else(|| VolscaleError::missing("backtest", "symbol"))?;
    let start_date = parse_date(
        adapter.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        adapter.get_string("backtest", "end_date").as_deref(),
        "end_date",
    )?;

    let provider = adapter
        .get_string("data", "provider")
        .map(|p| p.trim().to_lowercase())
        .unwrap_or_else(|| "alpaca".to_string());
    let data = if provider == "csv" {
        DataSource::Csv {
            dir: PathBuf::from(
                adapter
                    .get_string("data", "csv_dir")
                    .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string()),
            ),
        }
    } else {
        DataSource::Alpaca {
            base_url: adapter
                .get_string("data", "base_url")
                .unwrap_or_else(|| ALPACA_BASE_URL.to_string()),
            timeout_secs: adapter
                .get_int("data", "timeout_secs", DEFAULT_TIMEOUT_SECS)
                .max(1) as u64,
        }
    };

    Ok(StrategyConfig {
        symbol,
        start_date,
        end_date,
        indicators: indicator_params(adapter),
        exposure: exposure_params(adapter)?,
        data,
        output_dir: PathBuf::from(
            adapter
                .get_string("report", "output_dir")
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
        ),
    })
}

/// Build the price provider for `source`. Alpaca credentials are checked here,
/// before any request is made.
pub fn make_data_port(source: &DataSource) -> Result<Box<dyn DataPort>, VolscaleError> {
    make_data_port_with(source, |name| std::env::var(name).ok())
}

/// [`make_data_port`] with credentials resolved through `lookup` instead of
/// the process environment.
pub fn make_data_port_with(
    source: &DataSource,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Box<dyn DataPort>, VolscaleError> {
    match source {
        DataSource::Csv { dir } => Ok(Box::new(CsvAdapter::new(dir.clone()))),
        #[cfg(feature = "alpaca")]
        DataSource::Alpaca {
            base_url,
            timeout_secs,
        } => {
            use crate::adapters::alpaca_adapter::{AlpacaAdapter, Credentials};
            use std::time::Duration;
            let credentials = Credentials::from_lookup(lookup)?;
            Ok(Box::new(AlpacaAdapter::new(
                base_url,
                credentials,
                Duration::from_secs(*timeout_secs),
            )?))
        }
        #[cfg(not(feature = "alpaca"))]
        DataSource::Alpaca { .. } => {
            drop(lookup);
            Err(VolscaleError::invalid(
                "data",
                "provider",
                "built without the alpaca feature; use provider = csv",
            ))
        }
    }
}

/// Fetch, normalise and backtest. Fails with `NoData` when the provider has
/// nothing in the window and `InsufficientData` when nothing survives the
/// indicator warm-up.
pub fn fetch_and_run(
    data_port: &dyn DataPort,
    config: &StrategyConfig,
) -> Result<BacktestRun, VolscaleError> {
    info!(
        symbol = %config.symbol,
        start = %config.start_date,
        end = %config.end_date,
        "fetching daily bars"
    );
    let raw = data_port.fetch_ohlcv(&config.symbol, config.start_date, config.end_date)?;
    let (bars, dropped) = normalize_bars(raw);
    if dropped > 0 {
        warn!(dropped, "dropped bars with duplicate dates");
    }
    if bars.is_empty() {
        return Err(VolscaleError::NoData {
            symbol: config.symbol.clone(),
        });
    }
    info!(bars = bars.len(), first = %bars[0].date, last = %bars[bars.len() - 1].date, "bars loaded");

    let run = run_pipeline(&config.symbol, &bars, &config.indicators, &config.exposure);
    if run.is_empty() {
        warn!(
            bars = bars.len(),
            warmup = config.indicators.warmup(),
            "no records left after warm-up"
        );
        return Err(VolscaleError::InsufficientData {
            symbol: config.symbol.clone(),
            bars: bars.len(),
            minimum: config.indicators.min_bars(),
        });
    }
    Ok(run)
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    config: &StrategyConfig,
    reports: &[&dyn ReportPort],
) -> Result<Metrics, VolscaleError> {
    let run = fetch_and_run(data_port, config)?;
    let metrics = Metrics::compute(&run);

    print_summary(&run, &metrics);

    for report in reports {
        report.write(&run, config, &config.output_dir)?;
    }
    info!(dir = %config.output_dir.display(), "reports written");

    Ok(metrics)
}

pub fn format_summary(run: &BacktestRun, metrics: &Metrics) -> String {
    let first = run.records.first().map(|r| r.date().to_string()).unwrap_or_default();
    let last = run.records.last().map(|r| r.date().to_string()).unwrap_or_default();
    let s = &metrics.strategy;
    let b = &metrics.buy_hold;

    let mut out = String::new();
    out.push_str(&format!("\nFinal Results ({} {} to {})\n", run.symbol, first, last));
    out.push_str("----------------------------\n");
    out.push_str(&format!("Strategy multiple:   {:.2}x\n", s.final_multiple));
    out.push_str(&format!("Buy & Hold multiple: {:.2}x\n", b.final_multiple));
    out.push_str("\n                    Strategy   Buy & Hold\n");
    out.push_str(&format!(
        "Total Return:     {:>10.2}% {:>10.2}%\n",
        s.total_return * 100.0,
        b.total_return * 100.0
    ));
    out.push_str(&format!(
        "Annualized:       {:>10.2}% {:>10.2}%\n",
        s.annualized_return * 100.0,
        b.annualized_return * 100.0
    ));
    out.push_str(&format!(
        "Max Drawdown:     {:>10.1}% {:>10.1}%\n",
        -s.max_drawdown * 100.0,
        -b.max_drawdown * 100.0
    ));
    out.push_str(&format!(
        "Max DD Duration:  {:>9}d {:>10}d\n",
        s.max_drawdown_duration, b.max_drawdown_duration
    ));
    out.push_str(&format!(
        "\nTrading Days:     {}\nTime in Market:   {:.1}%\nAverage Position: {:.2}\n",
        metrics.trading_days,
        metrics.time_in_market * 100.0,
        metrics.average_position
    ));
    out
}

pub fn print_summary(run: &BacktestRun, metrics: &Metrics) {
    print!("{}", format_summary(run, metrics));
}

fn prepare_config(
    config_path: &Path,
    overrides: &Overrides,
) -> Result<StrategyConfig, VolscaleError> {
    info!(path = %config_path.display(), "loading config");
    let mut adapter = load_config(config_path)?;
    apply_overrides(&mut adapter, overrides);
    build_config(&adapter)
}

fn run_backtest(config_path: &Path, overrides: &Overrides) -> Result<(), VolscaleError> {
    let config = prepare_config(config_path, overrides)?;
    info!(strategy = %config.describe(), "config validated");

    let data_port = make_data_port(&config.data)?;
    let svg = SvgReportAdapter::new();
    let csv = CsvReportAdapter::new();
    run_backtest_pipeline(data_port.as_ref(), &config, &[&svg, &csv])?;
    Ok(())
}

fn run_validate(config_path: &Path, overrides: &Overrides) -> Result<(), VolscaleError> {
    let config = prepare_config(config_path, overrides)?;

    println!("Configuration is valid.");
    println!("  {}", config.describe());
    println!(
        "  window: {} (inclusive) to {} (exclusive)",
        config.start_date, config.end_date
    );
    println!(
        "  warm-up: {} bars dropped, at least {} bars needed",
        config.indicators.warmup(),
        config.indicators.min_bars()
    );
    match &config.data {
        DataSource::Alpaca { base_url, timeout_secs } => {
            println!("  data: alpaca {} (timeout {}s)", base_url, timeout_secs)
        }
        DataSource::Csv { dir } => println!("  data: csv {}", dir.display()),
    }
    println!("  reports: {}", config.output_dir.display());
    Ok(())
}
