//! Derived per-day series.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: one dated cell, `None` while undefined
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: a time series of indicator values
//!
//! The `Display` form of `IndicatorType` is the column name handed to the
//! presentation layer (`Daily_Ret`, `Cum_Ret`, `MA{N}`, `Volatility_{W}`).

pub mod returns;
pub mod sma;
pub mod volatility;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    DailyReturn,
    CumulativeReturn,
    MovingAverage(usize),
    Volatility(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn from_values(
        indicator_type: IndicatorType,
        dates: &[NaiveDate],
        values: Vec<Option<f64>>,
    ) -> Self {
        let values = dates
            .iter()
            .zip(values)
            .map(|(&date, value)| IndicatorPoint { date, value })
            .collect();
        Self {
            indicator_type,
            values,
        }
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.values.iter().map(|p| p.value).collect()
    }

    pub fn undefined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_none()).count()
    }

    pub fn last_defined(&self) -> Option<IndicatorPoint> {
        self.values.iter().rev().find(|p| p.value.is_some()).copied()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::DailyReturn => write!(f, "Daily_Ret"),
            IndicatorType::CumulativeReturn => write!(f, "Cum_Ret"),
            IndicatorType::MovingAverage(window) => write!(f, "MA{}", window),
            IndicatorType::Volatility(window) => write!(f, "Volatility_{}", window),
        }
    }
}
