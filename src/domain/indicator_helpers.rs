//! Indicator composition over one ticker's series.

use crate::domain::indicator::returns::{cumulative_returns, daily_returns};
use crate::domain::indicator::sma::moving_average;
use crate::domain::indicator::volatility::rolling_volatility;
use crate::domain::indicator::IndicatorType;
use crate::domain::ohlcv::{OhlcvRecord, TickerSeries};

pub const DEFAULT_MA_WINDOWS: [usize; 3] = [20, 50, 200];

/// One day of a series augmented with derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedRow {
    pub record: OhlcvRecord,
    pub daily_return: Option<f64>,
    pub cumulative_return: Option<f64>,
    /// Aligned with [`AugmentedSeries::ma_windows`].
    pub moving_averages: Vec<Option<f64>>,
    pub volatility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedSeries {
    pub ticker: String,
    pub ma_windows: Vec<usize>,
    pub volatility_window: Option<usize>,
    pub rows: Vec<AugmentedRow>,
}

impl AugmentedSeries {
    /// Derived column names in row order.
    pub fn indicator_columns(&self) -> Vec<IndicatorType> {
        let mut columns = vec![IndicatorType::DailyReturn, IndicatorType::CumulativeReturn];
        columns.extend(self.ma_windows.iter().map(|&w| IndicatorType::MovingAverage(w)));
        if let Some(w) = self.volatility_window {
            columns.push(IndicatorType::Volatility(w));
        }
        columns
    }

    pub fn column(&self, indicator: IndicatorType) -> Option<Vec<Option<f64>>> {
        match indicator {
            IndicatorType::DailyReturn => Some(self.rows.iter().map(|r| r.daily_return).collect()),
            IndicatorType::CumulativeReturn => {
                Some(self.rows.iter().map(|r| r.cumulative_return).collect())
            }
            IndicatorType::MovingAverage(window) => {
                let slot = self.ma_windows.iter().position(|&w| w == window)?;
                Some(self.rows.iter().map(|r| r.moving_averages[slot]).collect())
            }
            IndicatorType::Volatility(window) if self.volatility_window == Some(window) => {
                Some(self.rows.iter().map(|r| r.volatility).collect())
            }
            IndicatorType::Volatility(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Attaches `Daily_Ret`, `Cum_Ret`, one `MA{N}` per window and, when
/// requested, `Volatility_{W}` to a copy of `series`.
pub fn add_indicators(
    series: &TickerSeries,
    ma_windows: &[usize],
    volatility_window: Option<usize>,
) -> AugmentedSeries {
    let closes = series.closes();
    let daily = daily_returns(&closes);
    let cumulative = cumulative_returns(&daily);
    let averages: Vec<Vec<Option<f64>>> = ma_windows
        .iter()
        .map(|&w| moving_average(&closes, w))
        .collect();
    let volatility = volatility_window.map(|w| rolling_volatility(&daily, w));

    let rows = series
        .records()
        .iter()
        .enumerate()
        .map(|(i, record)| AugmentedRow {
            record: record.clone(),
            daily_return: daily[i],
            cumulative_return: cumulative[i],
            moving_averages: averages.iter().map(|ma| ma[i]).collect(),
            volatility: volatility.as_ref().and_then(|v| v[i]),
        })
        .collect();

    AugmentedSeries {
        ticker: series.ticker().to_string(),
        ma_windows: ma_windows.to_vec(),
        volatility_window,
        rows,
    }
}
