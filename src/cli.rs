//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::borrow::Borrow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvArchiveAdapter;
use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::alerts::{correlation_alerts, series_alerts};
use crate::domain::archive::ArchiveLoader;
use crate::domain::comparison::{
    cumulative_comparison, usable, Comparison, MIN_COMPARISON_TICKERS,
};
use crate::domain::config_validation::validate_dashboard_config;
use crate::domain::error::MarketWatchError;
use crate::domain::indicator_helpers::add_indicators;
use crate::domain::integrity::IntegrityReport;
use crate::domain::metrics::SummaryMetrics;
use crate::domain::ohlcv::{lookback_start, TickerSeries};
use crate::domain::settings::{parse_window_list, DashboardConfig};
use crate::domain::universe::{find_preset, limit_comparison, parse_tickers};
use crate::ports::export_port::ExportPort;

/// Exit code for `check` when the data fails the integrity thresholds.
pub const EXIT_INTEGRITY_FAILED: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "marketwatch", about = "Market-watch analytics over a local OHLCV archive")]
pub struct Cli {
    /// INI configuration file; defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Tracing filter, e.g. `debug` or `marketwatch=trace`
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Archive directory, overrides `[archive] path`
    #[arg(long, global = true)]
    pub archive: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tickers available in the archive
    Tickers,
    /// List configured comparison presets
    Presets,
    /// Headline metrics, integrity and alerts for one ticker
    Summary {
        #[arg(short, long)]
        ticker: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        risk_free_rate: Option<f64>,
    },
    /// Write a ticker's series with derived indicator columns as CSV
    Indicators {
        #[arg(short, long)]
        ticker: String,
        /// Moving-average windows, e.g. `20,50,200`
        #[arg(long)]
        ma: Option<String>,
        /// Rolling volatility window
        #[arg(long)]
        window: Option<usize>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Correlation and risk/return comparison across tickers
    Compare {
        /// Comma-separated tickers
        #[arg(long, conflicts_with = "preset", required_unless_present = "preset")]
        tickers: Option<String>,
        /// Named preset from `[presets]`
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Write the risk/return profile as CSV instead of a table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Data-integrity report; non-zero exit when the data is suspect
    Check {
        #[arg(short, long)]
        ticker: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.log_level.as_deref());

    let result = load_settings(cli.config.as_deref()).and_then(|mut settings| {
        if let Some(archive) = cli.archive {
            settings.archive_path = archive;
        }
        dispatch(cli.command, settings)
    });

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    // A subscriber may already be installed when `run` is called repeatedly.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn dispatch(command: Command, mut settings: DashboardConfig) -> Result<ExitCode, MarketWatchError> {
    match command {
        Command::Tickers => {
            validate_dashboard_config(&settings)?;
            run_tickers(&settings)
        }
        Command::Presets => {
            for preset in &settings.presets {
                println!("{}: {}", preset.name, preset.tickers.join(", "));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Summary {
            ticker,
            start,
            end,
            risk_free_rate,
        } => {
            if let Some(rate) = risk_free_rate {
                settings.risk_free_rate = rate;
            }
            validate_dashboard_config(&settings)?;
            run_summary(&settings, &ticker, start, end)
        }
        Command::Indicators {
            ticker,
            ma,
            window,
            start,
            end,
            output,
        } => {
            apply_indicator_overrides(&mut settings, ma.as_deref(), window)?;
            validate_dashboard_config(&settings)?;
            run_indicators(&settings, &ticker, start, end, output)
        }
        Command::Compare {
            tickers,
            preset,
            start,
            end,
            output,
        } => {
            validate_dashboard_config(&settings)?;
            let tickers =
                resolve_comparison_tickers(tickers.as_deref(), preset.as_deref(), &settings)?;
            run_compare(&settings, &tickers, start, end, output)
        }
        Command::Check { ticker } => {
            validate_dashboard_config(&settings)?;
            run_check(&settings, &ticker)
        }
    }
}

/// File settings, or the defaults when no file is given.
pub fn load_settings(config_path: Option<&Path>) -> Result<DashboardConfig, MarketWatchError> {
    let Some(path) = config_path else {
        return Ok(DashboardConfig::default());
    };
    info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| MarketWatchError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    DashboardConfig::from_config(&adapter)
}

pub fn apply_indicator_overrides(
    settings: &mut DashboardConfig,
    ma: Option<&str>,
    window: Option<usize>,
) -> Result<(), MarketWatchError> {
    if let Some(raw) = ma {
        settings.ma_windows =
            parse_window_list(raw).map_err(|reason| MarketWatchError::ConfigInvalid {
                section: "indicators".to_string(),
                key: "ma_windows".to_string(),
                reason,
            })?;
    }
    if let Some(window) = window {
        settings.volatility_window = window;
    }
    Ok(())
}

/// Explicit tickers win over a preset; the result is capped at
/// `max_compare`.
pub fn resolve_comparison_tickers(
    tickers: Option<&str>,
    preset: Option<&str>,
    settings: &DashboardConfig,
) -> Result<Vec<String>, MarketWatchError> {
    let invalid = |key: &str, reason: String| MarketWatchError::ConfigInvalid {
        section: "compare".to_string(),
        key: key.to_string(),
        reason,
    };

    let requested = match (tickers, preset) {
        (Some(list), _) => parse_tickers(list).map_err(|e| invalid("tickers", e.to_string()))?,
        (None, Some(name)) => find_preset(&settings.presets, name)
            .map_err(|e| invalid("preset", e.to_string()))?
            .tickers
            .clone(),
        (None, None) => {
            return Err(MarketWatchError::ConfigMissing {
                section: "compare".to_string(),
                key: "tickers".to_string(),
            })
        }
    };
    Ok(limit_comparison(requested, settings.max_compare))
}

/// Explicit bounds override the series' own extent.
pub fn resolve_range(
    series: &TickerSeries,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    let first = series.first_date()?;
    let last = series.last_date()?;
    Some((start.unwrap_or(first), end.unwrap_or(last)))
}

/// Trailing `lookback_days` window ending at the latest date in the batch,
/// unless explicit bounds are given.
pub fn batch_range<S: Borrow<TickerSeries>>(
    data: &[S],
    lookback_days: i64,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    let series = data.iter().map(Borrow::<TickerSeries>::borrow);
    let latest = series.clone().filter_map(TickerSeries::last_date).max()?;
    let earliest = series.filter_map(TickerSeries::first_date).min()?;
    let end = end.unwrap_or(latest);
    let start = start.unwrap_or_else(|| lookback_start(end, lookback_days, earliest));
    Some((start, end))
}

fn loader(settings: &DashboardConfig) -> ArchiveLoader<CsvArchiveAdapter> {
    ArchiveLoader::with_fresh_cache(CsvArchiveAdapter::with_suffix(
        settings.archive_path.clone(),
        &settings.file_suffix,
    ))
}

fn load_range(
    loader: &ArchiveLoader<CsvArchiveAdapter>,
    ticker: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<TickerSeries, MarketWatchError> {
    let series = loader.load(ticker)?;
    Ok(match resolve_range(&series, start, end) {
        Some((start, end)) => series.slice(start, end),
        None => TickerSeries::clone(&series),
    })
}

fn run_tickers(settings: &DashboardConfig) -> Result<ExitCode, MarketWatchError> {
    let tickers = loader(settings).discover_tickers()?;
    if tickers.is_empty() {
        eprintln!("No tickers found in {}", settings.archive_path.display());
    }
    for ticker in &tickers {
        println!("{}", ticker);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_summary(
    settings: &DashboardConfig,
    ticker: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<ExitCode, MarketWatchError> {
    let series = load_range(&loader(settings), ticker, start, end)?;
    print_summary(settings, &series)?;
    Ok(ExitCode::SUCCESS)
}

fn print_summary(settings: &DashboardConfig, series: &TickerSeries) -> Result<(), MarketWatchError> {
    let summary = SummaryMetrics::compute(
        series,
        settings.risk_free_rate,
        settings.trading_days_per_year,
    )?;

    println!("=== {} ===", summary.ticker);
    println!(
        "Range:             {} to {} ({} observations)",
        summary.first_date, summary.last_date, summary.observations
    );
    match summary.day_change {
        Some(change) => println!(
            "Latest close:      {:.2} ({:+.2}%)",
            summary.latest_close,
            change * 100.0
        ),
        None => println!("Latest close:      {:.2}", summary.latest_close),
    }
    println!("Annual return:     {}", percent(summary.annual_return));
    println!("Sharpe ratio:      {}", ratio(summary.sharpe_ratio));
    println!("Annual volatility: {}", percent(summary.annual_volatility));

    let report = IntegrityReport::inspect(series);
    println!(
        "Integrity:         {} ({:.1}% inverted ranges, {:.1}% positive volume)",
        if report.is_acceptable() { "ok" } else { "suspect" },
        report.inverted_range_fraction() * 100.0,
        report.positive_volume_fraction() * 100.0
    );

    let alerts = series_alerts(series, settings.volatility_window, &settings.alerts);
    for alert in &alerts {
        println!("Alert:             {}", alert);
    }
    Ok(())
}

fn run_indicators(
    settings: &DashboardConfig,
    ticker: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    output: Option<PathBuf>,
) -> Result<ExitCode, MarketWatchError> {
    let series = load_range(&loader(settings), ticker, start, end)?;
    let augmented = add_indicators(
        &series,
        &settings.ma_windows,
        Some(settings.volatility_window),
    );

    if let Some(path) = &output {
        info!(ticker, path = %path.display(), rows = augmented.len(), "writing indicators");
    }
    CsvExportAdapter::new(output).write_series(&augmented)?;
    Ok(ExitCode::SUCCESS)
}

fn run_compare(
    settings: &DashboardConfig,
    tickers: &[String],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    output: Option<PathBuf>,
) -> Result<ExitCode, MarketWatchError> {
    let loaded: Vec<Arc<TickerSeries>> = loader(settings).load_many(tickers);
    let Some((start, end)) = batch_range(&loaded, settings.lookback_days, start, end) else {
        return Err(MarketWatchError::DegenerateComparison {
            usable: 0,
            minimum: MIN_COMPARISON_TICKERS,
        });
    };
    let data: Vec<TickerSeries> = loaded.iter().map(|s| s.slice(start, end)).collect();

    let built = Comparison::build(&data, settings.trading_days_per_year, settings.min_history);
    let comparison = match built {
        Ok(c) => c,
        Err(e @ MarketWatchError::DegenerateComparison { .. }) => {
            return single_ticker_fallback(settings, &data, &e);
        }
        Err(e) => return Err(e),
    };

    if let Some(path) = output {
        info!(path = %path.display(), "writing risk/return profile");
        CsvExportAdapter::new(Some(path)).write_profile(&comparison.profile)?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("=== Comparison {} to {} ===", start, end);
    print_correlation(&comparison);

    println!("\nRisk / return (sorted by Sharpe):");
    println!("  {:<8} {:>10} {:>14} {:>8}", "Ticker", "Risk", "Annual Return", "Sharpe");
    for row in &comparison.profile {
        println!(
            "  {:<8} {:>9.2}% {:>13.2}% {:>8.2}",
            row.ticker,
            row.risk * 100.0,
            row.annual_return * 100.0,
            row.sharpe
        );
    }

    println!("\nCumulative return over range:");
    for curve in cumulative_comparison(&data, start, end) {
        let last = curve.curve.last_defined().and_then(|p| p.value);
        println!("  {:<8} {:>9}", curve.ticker, percent(last));
    }

    let pairs = correlation_alerts(&comparison.correlation, &settings.alerts);
    if !pairs.is_empty() {
        println!("\nDiversification candidates:");
        for alert in &pairs {
            println!("  {}", alert);
        }
    }

    for ticker in &comparison.short_history {
        println!(
            "\nnote: {} has fewer than {} observations in range",
            ticker, settings.min_history
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn print_correlation(comparison: &Comparison) {
    let matrix = &comparison.correlation;
    println!("\nCorrelation of daily returns:");
    print!("  {:<8}", "");
    for ticker in &matrix.tickers {
        print!(" {:>8}", ticker);
    }
    println!();
    for (ticker, row) in matrix.tickers.iter().zip(&matrix.values) {
        print!("  {:<8}", ticker);
        for value in row {
            print!(" {:>8}", ratio(*value));
        }
        println!();
    }
}

fn single_ticker_fallback(
    settings: &DashboardConfig,
    data: &[TickerSeries],
    err: &MarketWatchError,
) -> Result<ExitCode, MarketWatchError> {
    warn!(error = %err, "comparison not possible");
    let usable = usable(data);
    match usable.first() {
        Some(series) => {
            println!(
                "Comparison needs at least two tickers with data; showing {} alone.\n",
                series.ticker()
            );
            print_summary(settings, series)?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("error: {err}");
            Ok(err.into())
        }
    }
}

fn run_check(settings: &DashboardConfig, ticker: &str) -> Result<ExitCode, MarketWatchError> {
    let series = loader(settings).load(ticker)?;
    let report = IntegrityReport::inspect(&series);

    println!("=== {} integrity ===", report.ticker);
    println!("Observations:        {}", report.observations);
    println!(
        "Inverted high/low:   {} ({:.2}%)",
        report.inverted_ranges,
        report.inverted_range_fraction() * 100.0
    );
    println!("Non-positive prices: {}", report.non_positive_prices);
    println!(
        "Positive volume:     {} ({:.2}%)",
        report.positive_volume,
        report.positive_volume_fraction() * 100.0
    );

    if report.is_acceptable() {
        println!("Status:              ok");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Status:              suspect");
        Ok(ExitCode::from(EXIT_INTEGRITY_FAILED))
    }
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

fn ratio(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "n/a".to_string())
}
