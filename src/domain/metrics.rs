//! Whole-series scalar metrics for a single ticker.

use super::error::MarketWatchError;
use super::indicator::returns::daily_returns;
use super::ohlcv::TickerSeries;
use super::stats::{defined, mean, sample_stddev};
use chrono::NaiveDate;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Compounded annual growth: `(1 + total_return)^(days / len) - 1`.
///
/// Needs at least two records and a non-zero first close.
pub fn annual_return(series: &TickerSeries, trading_days: f64) -> Result<f64, MarketWatchError> {
    let records = series.records();
    if records.len() < 2 {
        return Err(insufficient(series, records.len(), 2));
    }

    let first = records[0].close;
    let last = records[records.len() - 1].close;
    if first == 0.0 {
        return Err(not_computable(series, "annual return", "first close is zero"));
    }

    let total_return = (last - first) / first;
    let years = records.len() as f64 / trading_days;
    let annual = (1.0 + total_return).powf(1.0 / years) - 1.0;
    if !annual.is_finite() {
        return Err(not_computable(
            series,
            "annual return",
            "growth factor is not finite",
        ));
    }
    Ok(annual)
}

/// Annualized Sharpe ratio of daily close-to-close returns.
///
/// `(mean(R) - rf / days) / stdev(R) * sqrt(days)`, exactly 0 when the
/// returns have zero deviation. Needs at least two defined returns.
pub fn sharpe_ratio(
    series: &TickerSeries,
    risk_free_rate: f64,
    trading_days: f64,
) -> Result<f64, MarketWatchError> {
    let returns = defined(&daily_returns(&series.closes()));
    let (Some(avg), Some(stddev)) = (mean(&returns), sample_stddev(&returns)) else {
        return Err(insufficient(series, returns.len(), 2));
    };

    let excess = avg - risk_free_rate / trading_days;
    if stddev == 0.0 {
        return Ok(0.0);
    }
    Ok(excess / stddev * trading_days.sqrt())
}

/// Sample deviation of daily returns scaled by `sqrt(days)`.
pub fn annualized_volatility(series: &TickerSeries, trading_days: f64) -> Option<f64> {
    let returns = defined(&daily_returns(&series.closes()));
    sample_stddev(&returns).map(|s| s * trading_days.sqrt())
}

fn insufficient(series: &TickerSeries, observations: usize, minimum: usize) -> MarketWatchError {
    MarketWatchError::InsufficientHistory {
        ticker: series.ticker().to_string(),
        observations,
        minimum,
    }
}

fn not_computable(series: &TickerSeries, metric: &str, reason: &str) -> MarketWatchError {
    MarketWatchError::NotComputable {
        ticker: series.ticker().to_string(),
        metric: metric.to_string(),
        reason: reason.to_string(),
    }
}

/// Headline numbers for the single-ticker view.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub ticker: String,
    pub observations: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub latest_close: f64,
    pub previous_close: Option<f64>,
    pub day_change: Option<f64>,
    pub annual_return: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub annual_volatility: Option<f64>,
}

impl SummaryMetrics {
    /// Metrics that cannot be computed on this series are left as `None`;
    /// an empty series is an error.
    pub fn compute(
        series: &TickerSeries,
        risk_free_rate: f64,
        trading_days: f64,
    ) -> Result<Self, MarketWatchError> {
        let records = series.records();
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return Err(insufficient(series, 0, 1));
        };

        let previous_close = records.len().checked_sub(2).map(|i| records[i].close);
        let day_change = previous_close
            .filter(|&prev| prev != 0.0)
            .map(|prev| (last.close - prev) / prev);

        Ok(Self {
            ticker: series.ticker().to_string(),
            observations: records.len(),
            first_date: first.date,
            last_date: last.date,
            latest_close: last.close,
            previous_close,
            day_change,
            annual_return: annual_return(series, trading_days).ok(),
            sharpe_ratio: sharpe_ratio(series, risk_free_rate, trading_days).ok(),
            annual_volatility: annualized_volatility(series, trading_days),
        })
    }
}
