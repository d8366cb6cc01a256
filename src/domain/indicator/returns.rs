//! Daily and cumulative returns.
//!
//! R[i] = (C[i] - C[i-1]) / C[i-1]
//! CUM[i] = prod(1 + R[k] for defined k <= i) - 1
//! Warmup: R[0] and CUM[0] are undefined. A zero or non-finite close on
//! either side leaves R[i] undefined; CUM is undefined at exactly the
//! positions where R is.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::TickerSeries;

pub fn daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let value = if i == 0 || closes[i - 1] == 0.0 {
            None
        } else {
            Some((closes[i] - closes[i - 1]) / closes[i - 1]).filter(|r| r.is_finite())
        };
        values.push(value);
    }
    values
}

pub fn cumulative_returns(returns: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|r| {
            r.map(|r| {
                growth *= 1.0 + r;
                growth - 1.0
            })
        })
        .collect()
}

pub fn calculate_cumulative_returns(series: &TickerSeries) -> IndicatorSeries {
    IndicatorSeries::from_values(
        IndicatorType::CumulativeReturn,
        &series.dates(),
        cumulative_returns(&daily_returns(&series.closes())),
    )
}
