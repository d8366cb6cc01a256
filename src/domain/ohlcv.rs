//! OHLCV record and per-ticker series representation.

use chrono::{Duration, NaiveDate};

/// One trading day of one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl OhlcvRecord {
    pub fn has_inverted_range(&self) -> bool {
        self.high < self.low
    }

    pub fn has_non_positive_price(&self) -> bool {
        self.open <= 0.0 || self.high <= 0.0 || self.low <= 0.0 || self.close <= 0.0
    }
}

/// Records of one ticker, strictly increasing by date.
///
/// Only [`TickerSeries::from_records`] and [`TickerSeries::slice`] construct
/// a series, so the ordering invariant holds for every instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSeries {
    ticker: String,
    records: Vec<OhlcvRecord>,
}

/// Outcome of normalizing raw archive rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub series: TickerSeries,
    pub duplicates_dropped: usize,
}

impl TickerSeries {
    /// Sorts ascending by date, keeps the first row for each date and stamps
    /// `ticker` onto every record.
    pub fn from_records(ticker: &str, mut records: Vec<OhlcvRecord>) -> Normalized {
        records.sort_by_key(|r| r.date);
        let before = records.len();
        records.dedup_by_key(|r| r.date);
        let duplicates_dropped = before - records.len();

        for record in &mut records {
            if record.ticker != ticker {
                record.ticker = ticker.to_string();
            }
        }

        Normalized {
            series: Self::from_sorted(ticker.to_string(), records),
            duplicates_dropped,
        }
    }

    fn from_sorted(ticker: String, records: Vec<OhlcvRecord>) -> Self {
        Self { ticker, records }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn records(&self) -> &[OhlcvRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Owned copy of the records with `start <= date <= end`.
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> TickerSeries {
        let lo = self.records.partition_point(|r| r.date < start);
        let hi = self.records.partition_point(|r| r.date <= end);
        let records = if lo < hi {
            self.records[lo..hi].to_vec()
        } else {
            Vec::new()
        };
        Self::from_sorted(self.ticker.clone(), records)
    }

    /// The trailing `lookback_days` calendar window ending at the last record,
    /// clamped to the first record.
    pub fn default_range(&self, lookback_days: i64) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.first_date()?;
        let last = self.last_date()?;
        Some((lookback_start(last, lookback_days, first), last))
    }
}

/// `end` minus `lookback_days`, never earlier than `earliest`. A window too
/// long to represent as a date reaches back to `earliest`.
pub fn lookback_start(end: NaiveDate, lookback_days: i64, earliest: NaiveDate) -> NaiveDate {
    Duration::try_days(lookback_days)
        .and_then(|span| end.checked_sub_signed(span))
        .map_or(earliest, |start| start.max(earliest))
}
