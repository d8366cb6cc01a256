#![allow(dead_code)]

use chrono::NaiveDate;
use marketwatch::domain::error::MarketWatchError;
pub use marketwatch::domain::ohlcv::{OhlcvRecord, TickerSeries};
use marketwatch::ports::archive_port::ArchivePort;
use std::collections::BTreeMap;
use std::path::Path;

pub struct MockArchivePort {
    pub data: BTreeMap<String, Vec<OhlcvRecord>>,
    pub errors: BTreeMap<String, String>,
}

impl MockArchivePort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_records(mut self, ticker: &str, records: Vec<OhlcvRecord>) -> Self {
        self.data.insert(ticker.to_string(), records);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl ArchivePort for MockArchivePort {
    fn list_tickers(&self) -> Result<Vec<String>, MarketWatchError> {
        let mut tickers: Vec<String> = self
            .data
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect();
        tickers.sort();
        Ok(tickers)
    }

    fn read_records(&self, ticker: &str) -> Result<Vec<OhlcvRecord>, MarketWatchError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(MarketWatchError::ArchiveRead {
                file: format!("{ticker}_stock_market_data.csv"),
                reason: reason.clone(),
            });
        }
        self.data
            .get(ticker)
            .cloned()
            .ok_or_else(|| MarketWatchError::TickerNotFound {
                ticker: ticker.to_string(),
                suggestions: Vec::new(),
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_record(date: &str, close: f64) -> OhlcvRecord {
    OhlcvRecord {
        ticker: String::new(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// One record per calendar day starting at `start_date`.
pub fn records_from_closes(start_date: &str, closes: &[f64]) -> Vec<OhlcvRecord> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvRecord {
            ticker: String::new(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        })
        .collect()
}

pub fn series_from_closes(ticker: &str, start_date: &str, closes: &[f64]) -> TickerSeries {
    TickerSeries::from_records(ticker, records_from_closes(start_date, closes)).series
}

/// Linear drift with a deterministic wobble so returns have non-zero spread.
pub fn generate_closes(count: usize, start_price: f64, drift: f64) -> Vec<f64> {
    (0..count)
        .map(|i| start_price + drift * i as f64 + if i % 3 == 0 { 0.5 } else { -0.25 })
        .collect()
}

/// Writes one `{ticker}_stock_market_data.csv` file, rows as given.
pub fn write_archive_file(dir: &Path, ticker: &str, records: &[OhlcvRecord]) {
    let mut content = String::from("Date,Open,High,Low,Close,Volume\n");
    for r in records {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            r.date, r.open, r.high, r.low, r.close, r.volume
        ));
    }
    std::fs::write(dir.join(format!("{ticker}_stock_market_data.csv")), content).unwrap();
}
