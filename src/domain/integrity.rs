//! Soft data-quality checks on a loaded series.
//!
//! Violations are counted and reported; a series is never rejected for them.

use crate::domain::ohlcv::TickerSeries;

pub const MAX_INVERTED_RANGE_FRACTION: f64 = 0.05;
pub const MIN_POSITIVE_VOLUME_FRACTION: f64 = 0.95;

#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityReport {
    pub ticker: String,
    pub observations: usize,
    /// Rows with `high < low`.
    pub inverted_ranges: usize,
    /// Rows with any price at or below zero.
    pub non_positive_prices: usize,
    pub positive_volume: usize,
}

impl IntegrityReport {
    pub fn inspect(series: &TickerSeries) -> Self {
        let records = series.records();
        Self {
            ticker: series.ticker().to_string(),
            observations: records.len(),
            inverted_ranges: records.iter().filter(|r| r.has_inverted_range()).count(),
            non_positive_prices: records.iter().filter(|r| r.has_non_positive_price()).count(),
            positive_volume: records.iter().filter(|r| r.volume > 0).count(),
        }
    }

    pub fn inverted_range_fraction(&self) -> f64 {
        fraction(self.inverted_ranges, self.observations)
    }

    pub fn positive_volume_fraction(&self) -> f64 {
        fraction(self.positive_volume, self.observations)
    }

    pub fn is_acceptable(&self) -> bool {
        self.observations > 0
            && self.inverted_range_fraction() < MAX_INVERTED_RANGE_FRACTION
            && self.positive_volume_fraction() >= MIN_POSITIVE_VOLUME_FRACTION
    }
}

fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
