//! CSV export adapter implementing ExportPort.
//!
//! Writes to a file when a path is given, otherwise to stdout. Undefined
//! values become empty cells.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::domain::comparison::{CorrelationMatrix, RiskReturnRow};
use crate::domain::error::MarketWatchError;
use crate::domain::indicator_helpers::AugmentedSeries;
use crate::ports::export_port::ExportPort;

const RECORD_COLUMNS: [&str; 7] = ["Date", "Open", "High", "Low", "Close", "Volume", "Ticker"];

pub struct CsvExportAdapter {
    output: Option<PathBuf>,
}

impl CsvExportAdapter {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }

    pub fn stdout() -> Self {
        Self::new(None)
    }

    fn open(&self) -> Result<csv::Writer<Box<dyn Write>>, MarketWatchError> {
        let sink: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stdout()),
        };
        Ok(csv::Writer::from_writer(sink))
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_error(err: csv::Error) -> MarketWatchError {
    MarketWatchError::Io(io::Error::other(err))
}

impl ExportPort for CsvExportAdapter {
    fn write_series(&self, series: &AugmentedSeries) -> Result<(), MarketWatchError> {
        let mut wtr = self.open()?;

        let mut header: Vec<String> = RECORD_COLUMNS.iter().map(|c| c.to_string()).collect();
        header.extend(series.indicator_columns().iter().map(|c| c.to_string()));
        wtr.write_record(&header).map_err(csv_error)?;

        for row in &series.rows {
            let r = &row.record;
            let mut fields = vec![
                r.date.to_string(),
                r.open.to_string(),
                r.high.to_string(),
                r.low.to_string(),
                r.close.to_string(),
                r.volume.to_string(),
                r.ticker.clone(),
                cell(row.daily_return),
                cell(row.cumulative_return),
            ];
            fields.extend(row.moving_averages.iter().map(|&v| cell(v)));
            if series.volatility_window.is_some() {
                fields.push(cell(row.volatility));
            }
            wtr.write_record(&fields).map_err(csv_error)?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn write_profile(&self, rows: &[RiskReturnRow]) -> Result<(), MarketWatchError> {
        let mut wtr = self.open()?;
        for row in rows {
            wtr.serialize(row).map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_correlation(&self, matrix: &CorrelationMatrix) -> Result<(), MarketWatchError> {
        let mut wtr = self.open()?;

        let mut header = vec!["Ticker".to_string()];
        header.extend(matrix.tickers.iter().cloned());
        wtr.write_record(&header).map_err(csv_error)?;

        for (ticker, values) in matrix.tickers.iter().zip(&matrix.values) {
            let mut fields = vec![ticker.clone()];
            fields.extend(values.iter().map(|&v| cell(v)));
            wtr.write_record(&fields).map_err(csv_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator_helpers::add_indicators;
    use crate::domain::ohlcv::{OhlcvRecord, TickerSeries};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn make_series(closes: &[f64]) -> TickerSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = closes
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
            .collect();
        TickerSeries::from_records("AAPL", records).series
    }

    #[test]
    fn series_export_has_indicator_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aapl.csv");
        let augmented = add_indicators(&make_series(&[100.0, 110.0, 121.0]), &[2], Some(2));

        CsvExportAdapter::new(Some(path.clone()))
            .write_series(&augmented)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "Date,Open,High,Low,Close,Volume,Ticker,Daily_Ret,Cum_Ret,MA2,Volatility_2"
        );
        assert_eq!(lines[1], "2024-01-01,100,101,99,100,1000,AAPL,,,,");
        assert!(lines[2].starts_with("2024-01-02,110,111,109,110,1000,AAPL,0.1"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn series_export_without_volatility() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("aapl.csv");
        let augmented = add_indicators(&make_series(&[100.0, 101.0]), &[20], None);

        CsvExportAdapter::new(Some(path.clone()))
            .write_series(&augmented)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Date,Open,High,Low,Close,Volume,Ticker,Daily_Ret,Cum_Ret,MA20\n"));
    }

    #[test]
    fn profile_export_uses_renamed_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.csv");
        let rows = vec![RiskReturnRow {
            ticker: "MSFT".to_string(),
            risk: 0.5,
            annual_return: 0.25,
            sharpe: 2.0,
        }];

        CsvExportAdapter::new(Some(path.clone()))
            .write_profile(&rows)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Ticker,Risk,Annual_Return,Sharpe\nMSFT,0.5,0.25,2.0\n");
    }

    #[test]
    fn correlation_export_blank_for_undefined() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corr.csv");
        let matrix = CorrelationMatrix {
            tickers: vec!["A".into(), "B".into()],
            values: vec![vec![Some(1.0), None], vec![None, Some(1.0)]],
        };

        CsvExportAdapter::new(Some(path.clone()))
            .write_correlation(&matrix)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Ticker,A,B\nA,1,\nB,,1\n");
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let adapter = CsvExportAdapter::new(Some(PathBuf::from("/nonexistent/dir/out.csv")));
        let err = adapter.write_profile(&[]).unwrap_err();
        assert!(matches!(err, MarketWatchError::Io(_)));
    }
}
