//! CSV archive adapter: one `{TICKER}{suffix}` file per ticker.

use crate::domain::error::MarketWatchError;
use crate::domain::ohlcv::OhlcvRecord;
use crate::domain::settings::DEFAULT_FILE_SUFFIX;
use crate::ports::archive_port::ArchivePort;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs;
use std::path::PathBuf;

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvArchiveAdapter {
    base_path: PathBuf,
    suffix: String,
}

impl CsvArchiveAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self::with_suffix(base_path, DEFAULT_FILE_SUFFIX)
    }

    pub fn with_suffix(base_path: PathBuf, suffix: &str) -> Self {
        Self {
            base_path,
            suffix: suffix.to_string(),
        }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}{}", ticker, self.suffix))
    }

    fn archive_not_found(&self) -> MarketWatchError {
        MarketWatchError::ArchiveNotFound {
            path: self.base_path.display().to_string(),
        }
    }
}

/// Column positions resolved from the header row, case-insensitively.
struct ColumnMap([usize; 6]);

impl ColumnMap {
    fn from_headers(headers: &StringRecord, file: &str) -> Result<Self, MarketWatchError> {
        let mut positions = [0usize; 6];
        for (slot, name) in COLUMNS.iter().enumerate() {
            positions[slot] = headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| MarketWatchError::ArchiveRead {
                    file: file.to_string(),
                    reason: format!("missing {} column", name),
                })?;
        }
        Ok(Self(positions))
    }

    fn field<'r>(&self, record: &'r StringRecord, slot: usize) -> &'r str {
        record.get(self.0[slot]).unwrap_or("")
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            // Datetime stamps such as "2020-01-02 00:00:00-05:00".
            value
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

fn parse_volume(value: &str) -> Option<u64> {
    value.parse::<u64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}

impl ArchivePort for CsvArchiveAdapter {
    fn list_tickers(&self) -> Result<Vec<String>, MarketWatchError> {
        let entries = fs::read_dir(&self.base_path).map_err(|_| self.archive_not_found())?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MarketWatchError::ArchiveRead {
                file: self.base_path.display().to_string(),
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.len() > self.suffix.len() && name.ends_with(&self.suffix) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names
            .into_iter()
            .map(|name| name[..name.len() - self.suffix.len()].to_string())
            .collect())
    }

    fn read_records(&self, ticker: &str) -> Result<Vec<OhlcvRecord>, MarketWatchError> {
        if !self.base_path.is_dir() {
            return Err(self.archive_not_found());
        }

        let path = self.csv_path(ticker);
        if !path.is_file() {
            return Err(MarketWatchError::TickerNotFound {
                ticker: ticker.to_string(),
                suggestions: Vec::new(),
            });
        }

        let file = path.display().to_string();
        let read_error = |reason: String| MarketWatchError::ArchiveRead {
            file: file.clone(),
            reason,
        };

        let mut rdr = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(&path)
            .map_err(|e| read_error(e.to_string()))?;
        let headers = rdr
            .headers()
            .map_err(|e| read_error(format!("CSV header error: {}", e)))?
            .clone();
        let columns = ColumnMap::from_headers(&headers, &file)?;

        let mut records = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            // +2: one for the header, one for 1-based numbering.
            let line = row + 2;
            let record = result.map_err(|e| read_error(format!("CSV parse error: {}", e)))?;

            let date_str = columns.field(&record, 0);
            let date = parse_date(date_str).ok_or_else(|| {
                read_error(format!("line {}: invalid date {:?}", line, date_str))
            })?;

            let mut prices = [0.0f64; 4];
            for (i, price) in prices.iter_mut().enumerate() {
                let raw = columns.field(&record, i + 1);
                *price = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        read_error(format!(
                            "line {}: invalid {} value {:?}",
                            line,
                            COLUMNS[i + 1],
                            raw
                        ))
                    })?;
            }

            let raw_volume = columns.field(&record, 5);
            let volume = parse_volume(raw_volume).ok_or_else(|| {
                read_error(format!("line {}: invalid volume value {:?}", line, raw_volume))
            })?;

            let [open, high, low, close] = prices;
            records.push(OhlcvRecord {
                ticker: ticker.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        Ok(records)
    }
}
