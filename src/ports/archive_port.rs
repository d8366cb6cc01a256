//! Read-only access to per-ticker historical archives.

use crate::domain::error::MarketWatchError;
use crate::domain::ohlcv::OhlcvRecord;

pub trait ArchivePort {
    /// Ticker symbols with a backing record file, in lexicographic order of
    /// their file names. Fails with `ArchiveNotFound` when the archive
    /// location is inaccessible.
    fn list_tickers(&self) -> Result<Vec<String>, MarketWatchError>;

    /// Raw records for one ticker, in file order. Fails with
    /// `TickerNotFound` (empty suggestions) when no backing file exists.
    fn read_records(&self, ticker: &str) -> Result<Vec<OhlcvRecord>, MarketWatchError>;
}
