//! Threshold alerts over derived series and correlation matrices.

use crate::domain::comparison::CorrelationMatrix;
use crate::domain::indicator::returns::daily_returns;
use crate::domain::indicator::volatility::rolling_volatility;
use crate::domain::ohlcv::TickerSeries;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Daily rolling volatility above this raises an alert.
    pub high_volatility: f64,
    /// Absolute single-day return above this raises an alert.
    pub extreme_return: f64,
    /// Absolute pairwise correlation below this is a diversification hint.
    pub low_correlation: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            high_volatility: 0.04,
            extreme_return: 0.10,
            low_correlation: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    HighVolatility {
        ticker: String,
        date: NaiveDate,
        volatility: f64,
    },
    ExtremeReturn {
        ticker: String,
        date: NaiveDate,
        daily_return: f64,
    },
    LowCorrelation {
        first: String,
        second: String,
        correlation: f64,
    },
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::HighVolatility {
                ticker,
                date,
                volatility,
            } => write!(
                f,
                "{ticker}: high volatility {:.2}% on {date}",
                volatility * 100.0
            ),
            Alert::ExtremeReturn {
                ticker,
                date,
                daily_return,
            } => write!(
                f,
                "{ticker}: extreme daily return {:+.2}% on {date}",
                daily_return * 100.0
            ),
            Alert::LowCorrelation {
                first,
                second,
                correlation,
            } => write!(f, "{first}/{second}: low correlation {correlation:.2}"),
        }
    }
}

/// Checks the latest day of `series` against the volatility and return
/// thresholds.
pub fn series_alerts(
    series: &TickerSeries,
    volatility_window: usize,
    thresholds: &AlertThresholds,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let Some(last) = series.records().last() else {
        return alerts;
    };

    let returns = daily_returns(&series.closes());
    let volatility = rolling_volatility(&returns, volatility_window);

    if let Some(vol) = volatility
        .last()
        .copied()
        .flatten()
        .filter(|v| *v > thresholds.high_volatility)
    {
        alerts.push(Alert::HighVolatility {
            ticker: series.ticker().to_string(),
            date: last.date,
            volatility: vol,
        });
    }

    if let Some(r) = returns
        .last()
        .copied()
        .flatten()
        .filter(|r| r.abs() > thresholds.extreme_return)
    {
        alerts.push(Alert::ExtremeReturn {
            ticker: series.ticker().to_string(),
            date: last.date,
            daily_return: r,
        });
    }

    alerts
}

/// Pairs whose absolute correlation falls below the threshold.
pub fn correlation_alerts(matrix: &CorrelationMatrix, thresholds: &AlertThresholds) -> Vec<Alert> {
    matrix
        .pairs()
        .into_iter()
        .filter(|(_, _, rho)| rho.abs() < thresholds.low_correlation)
        .map(|(a, b, rho)| Alert::LowCorrelation {
            first: a.to_string(),
            second: b.to_string(),
            correlation: rho,
        })
        .collect()
}
