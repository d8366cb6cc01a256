//! Cross-sectional analysis over a batch of tickers.
//!
//! Every function here takes the batch in insertion order and computes each
//! ticker's derived columns independently before combining them.

use crate::domain::error::MarketWatchError;
use crate::domain::indicator::returns::{calculate_cumulative_returns, daily_returns};
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::TickerSeries;
use crate::domain::stats::{defined, mean, pairwise_pearson, sample_stddev};
use chrono::NaiveDate;
use serde::Serialize;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

pub const MIN_COMPARISON_TICKERS: usize = 2;
const MIN_RETURN_OBSERVATIONS: usize = 2;

/// One column per ticker, outer-aligned on the union of all dates.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsPivot {
    pub tickers: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// Column-major: `columns[t][d]` is ticker `t` on `dates[d]`.
    pub columns: Vec<Vec<Option<f64>>>,
}

impl ReturnsPivot {
    pub fn column(&self, ticker: &str) -> Option<&[Option<f64>]> {
        let i = self.tickers.iter().position(|t| t == ticker)?;
        Some(&self.columns[i])
    }

    pub fn defined_cells(&self) -> usize {
        self.columns.iter().flatten().filter(|v| v.is_some()).count()
    }
}

pub fn returns_pivot<S: Borrow<TickerSeries>>(data: &[S]) -> ReturnsPivot {
    let dates: Vec<NaiveDate> = data
        .iter()
        .flat_map(|s| Borrow::<TickerSeries>::borrow(s).records().iter().map(|r| r.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let row_of: HashMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();

    let mut tickers = Vec::with_capacity(data.len());
    let mut columns = Vec::with_capacity(data.len());
    for series in data {
        let series: &TickerSeries = series.borrow();
        let mut column = vec![None; dates.len()];
        for (record, value) in series.records().iter().zip(daily_returns(&series.closes())) {
            column[row_of[&record.date]] = value;
        }
        tickers.push(series.ticker().to_string());
        columns.push(column);
    }

    ReturnsPivot {
        tickers,
        dates,
        columns,
    }
}

/// Square, symmetric matrix of pairwise-complete Pearson correlations.
///
/// The diagonal is exactly 1.0. Off-diagonal cells are `None` when a pair
/// shares fewer than two dated returns or one side is flat over the overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|t| t == a)?;
        let j = self.tickers.iter().position(|t| t == b)?;
        self.values[i][j]
    }

    pub fn size(&self) -> usize {
        self.tickers.len()
    }

    /// Upper-triangle pairs `(a, b, rho)` with a defined correlation.
    pub fn pairs(&self) -> Vec<(&str, &str, f64)> {
        let mut pairs = Vec::new();
        for i in 0..self.tickers.len() {
            for j in (i + 1)..self.tickers.len() {
                if let Some(rho) = self.values[i][j] {
                    pairs.push((self.tickers[i].as_str(), self.tickers[j].as_str(), rho));
                }
            }
        }
        pairs
    }
}

/// Tickers with enough daily returns to take part in a comparison, in
/// input order.
pub fn usable<S: Borrow<TickerSeries>>(data: &[S]) -> Vec<&TickerSeries> {
    data.iter()
        .map(Borrow::<TickerSeries>::borrow)
        .filter(|s| {
            let defined_returns = daily_returns(&s.closes()).iter().flatten().count();
            if defined_returns < MIN_RETURN_OBSERVATIONS {
                tracing::warn!(
                    ticker = s.ticker(),
                    returns = defined_returns,
                    "omitting ticker from comparison (too few returns)"
                );
                false
            } else {
                true
            }
        })
        .collect()
}

pub fn correlation_matrix<S: Borrow<TickerSeries>>(
    data: &[S],
) -> Result<CorrelationMatrix, MarketWatchError> {
    correlation_of(&usable(data))
}

fn correlation_of(usable: &[&TickerSeries]) -> Result<CorrelationMatrix, MarketWatchError> {
    if usable.len() < MIN_COMPARISON_TICKERS {
        return Err(MarketWatchError::DegenerateComparison {
            usable: usable.len(),
            minimum: MIN_COMPARISON_TICKERS,
        });
    }

    let pivot = returns_pivot(usable);
    let n = pivot.tickers.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let rho = pairwise_pearson(&pivot.columns[i], &pivot.columns[j]);
            values[i][j] = rho;
            values[j][i] = rho;
        }
    }

    Ok(CorrelationMatrix {
        tickers: pivot.tickers,
        values,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReturnRow {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    /// Sample deviation of daily returns.
    #[serde(rename = "Risk")]
    pub risk: f64,
    #[serde(rename = "Annual_Return")]
    pub annual_return: f64,
    #[serde(rename = "Sharpe")]
    pub sharpe: f64,
}

/// One row per ticker with at least two daily returns, sorted by Sharpe
/// descending; ties keep input order.
///
/// Annual return here is `mean(R) * days` and Sharpe is
/// `mean(R) / stdev(R) * sqrt(days)` with no risk-free adjustment, unlike
/// [`crate::domain::metrics::sharpe_ratio`].
pub fn risk_return_profile<S: Borrow<TickerSeries>>(
    data: &[S],
    trading_days: f64,
) -> Vec<RiskReturnRow> {
    profile_of(&usable(data), trading_days)
}

fn profile_of(usable: &[&TickerSeries], trading_days: f64) -> Vec<RiskReturnRow> {
    let mut rows: Vec<RiskReturnRow> = usable
        .iter()
        .filter_map(|series| {
            let returns = defined(&daily_returns(&series.closes()));
            let risk = sample_stddev(&returns)?;
            let daily_mean = mean(&returns)?;
            let sharpe = if risk > 0.0 {
                daily_mean / risk * trading_days.sqrt()
            } else {
                0.0
            };
            Some(RiskReturnRow {
                ticker: series.ticker().to_string(),
                risk,
                annual_return: daily_mean * trading_days,
                sharpe,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.sharpe.partial_cmp(&a.sharpe).unwrap_or(Ordering::Equal));
    rows
}

/// A ticker's cumulative-return curve over a date range.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeCurve {
    pub ticker: String,
    pub curve: IndicatorSeries,
}

/// Cumulative returns recomputed inside `[start, end]` so every curve starts
/// from its first return in the range.
pub fn cumulative_comparison<S: Borrow<TickerSeries>>(
    data: &[S],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<CumulativeCurve> {
    data.iter()
        .map(|s| {
            let series = Borrow::<TickerSeries>::borrow(s).slice(start, end);
            CumulativeCurve {
                ticker: series.ticker().to_string(),
                curve: calculate_cumulative_returns(&series),
            }
        })
        .collect()
}

/// Everything the comparative view renders for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub pivot: ReturnsPivot,
    pub correlation: CorrelationMatrix,
    pub profile: Vec<RiskReturnRow>,
    /// Tickers below the minimum history; included but flagged.
    pub short_history: Vec<String>,
}

impl Comparison {
    pub fn build<S: Borrow<TickerSeries>>(
        data: &[S],
        trading_days: f64,
        min_history: usize,
    ) -> Result<Self, MarketWatchError> {
        let usable = usable(data);
        let correlation = correlation_of(&usable)?;
        let profile = profile_of(&usable, trading_days);

        let short_history: Vec<String> = data
            .iter()
            .map(Borrow::<TickerSeries>::borrow)
            .filter(|s| s.len() < min_history)
            .map(|s| s.ticker().to_string())
            .collect();
        for ticker in &short_history {
            tracing::warn!(ticker, min_history, "history shorter than recommended minimum");
        }

        Ok(Self {
            pivot: returns_pivot(data),
            correlation,
            profile,
            short_history,
        })
    }
}
