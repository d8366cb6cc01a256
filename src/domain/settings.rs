//! Typed dashboard settings read through a [`ConfigPort`].

use crate::domain::alerts::AlertThresholds;
use crate::domain::error::MarketWatchError;
use crate::domain::indicator_helpers::DEFAULT_MA_WINDOWS;
use crate::domain::metrics::{DEFAULT_RISK_FREE_RATE, TRADING_DAYS_PER_YEAR};
use crate::domain::universe::{builtin_presets, parse_tickers, Preset};
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

pub const DEFAULT_ARCHIVE_DIR: &str = "archive";
pub const DEFAULT_FILE_SUFFIX: &str = "_stock_market_data.csv";
pub const DEFAULT_VOLATILITY_WINDOW: usize = 30;
pub const DEFAULT_MIN_HISTORY: usize = 250;
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;
/// Upper bound on `lookback_days`, roughly a century.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;
pub const DEFAULT_MAX_COMPARE: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub archive_path: PathBuf,
    pub file_suffix: String,
    pub ma_windows: Vec<usize>,
    pub volatility_window: usize,
    pub risk_free_rate: f64,
    pub trading_days_per_year: f64,
    /// Tickers with fewer records are flagged in comparisons.
    pub min_history: usize,
    pub lookback_days: i64,
    pub max_compare: usize,
    pub alerts: AlertThresholds,
    pub presets: Vec<Preset>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from(DEFAULT_ARCHIVE_DIR),
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            ma_windows: DEFAULT_MA_WINDOWS.to_vec(),
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            min_history: DEFAULT_MIN_HISTORY,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_compare: DEFAULT_MAX_COMPARE,
            alerts: AlertThresholds::default(),
            presets: builtin_presets(),
        }
    }
}

impl DashboardConfig {
    /// Missing keys fall back to the defaults; present but malformed keys
    /// are errors.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, MarketWatchError> {
        let defaults = Self::default();

        let archive_path = config
            .get_string("archive", "path")
            .map(PathBuf::from)
            .unwrap_or(defaults.archive_path);
        let file_suffix = config
            .get_string("archive", "file_suffix")
            .unwrap_or(defaults.file_suffix);

        let ma_windows = match config.get_string("indicators", "ma_windows") {
            Some(raw) => parse_window_list(&raw)
                .map_err(|reason| invalid("indicators", "ma_windows", reason))?,
            None => defaults.ma_windows,
        };

        let alerts = AlertThresholds {
            high_volatility: config.get_double(
                "alerts",
                "high_volatility",
                defaults.alerts.high_volatility,
            )?,
            extreme_return: config.get_double(
                "alerts",
                "extreme_return",
                defaults.alerts.extreme_return,
            )?,
            low_correlation: config.get_double(
                "alerts",
                "low_correlation",
                defaults.alerts.low_correlation,
            )?,
        };

        Ok(Self {
            archive_path,
            file_suffix,
            ma_windows,
            volatility_window: get_count(
                config,
                "indicators",
                "volatility_window",
                defaults.volatility_window,
            )?,
            risk_free_rate: config.get_double(
                "analysis",
                "risk_free_rate",
                defaults.risk_free_rate,
            )?,
            trading_days_per_year: config.get_double(
                "analysis",
                "trading_days_per_year",
                defaults.trading_days_per_year,
            )?,
            min_history: get_count(config, "analysis", "min_history", defaults.min_history)?,
            lookback_days: config.get_int("analysis", "lookback_days", defaults.lookback_days)?,
            max_compare: get_count(config, "analysis", "max_compare", defaults.max_compare)?,
            alerts,
            presets: read_presets(config)?,
        })
    }
}

/// Parses `20,50,200` into window lengths.
pub fn parse_window_list(input: &str) -> Result<Vec<usize>, String> {
    input
        .split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<usize>()
                .map_err(|_| format!("{:?} is not a window length", token))
        })
        .collect()
}

fn get_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, MarketWatchError> {
    let value = config.get_int(section, key, default as i64)?;
    usize::try_from(value)
        .map_err(|_| invalid(section, key, format!("{} must not be negative", key)))
}

fn read_presets(config: &dyn ConfigPort) -> Result<Vec<Preset>, MarketWatchError> {
    let keys = config.section_keys("presets");
    if keys.is_empty() {
        return Ok(builtin_presets());
    }

    let mut presets = Vec::with_capacity(keys.len());
    for name in keys {
        let raw = config.get_string("presets", &name).unwrap_or_default();
        let tickers = parse_tickers(&raw).map_err(|e| invalid("presets", &name, e.to_string()))?;
        presets.push(Preset { name, tickers });
    }
    Ok(presets)
}

fn invalid(section: &str, key: &str, reason: String) -> MarketWatchError {
    MarketWatchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
