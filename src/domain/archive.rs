//! Cached archive loader.
//!
//! Series are read through an [`ArchivePort`], normalized once and published
//! into a [`SeriesCache`]. Entries are insert-only: a cached series is never
//! replaced, so every caller holding an `Arc` sees a complete value.

use crate::domain::error::MarketWatchError;
use crate::domain::ohlcv::TickerSeries;
use crate::ports::archive_port::ArchivePort;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// How many discovered tickers a `TickerNotFound` error suggests.
pub const MAX_SUGGESTIONS: usize = 10;

/// Process-lifetime store of normalized series keyed by exact ticker.
#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: Mutex<HashMap<String, Arc<TickerSeries>>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    // Inserts are a single map assignment of a finished value, so a poisoned
    // lock still guards a consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<TickerSeries>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, ticker: &str) -> Option<Arc<TickerSeries>> {
        self.lock().get(ticker).cloned()
    }

    /// Publishes `series` unless another caller got there first; either way
    /// returns the entry that is now cached.
    pub fn insert_if_absent(&self, ticker: &str, series: TickerSeries) -> Arc<TickerSeries> {
        self.lock()
            .entry(ticker.to_string())
            .or_insert_with(|| Arc::new(series))
            .clone()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.lock().contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct ArchiveLoader<P: ArchivePort> {
    port: P,
    cache: Arc<SeriesCache>,
}

impl<P: ArchivePort> ArchiveLoader<P> {
    pub fn new(port: P, cache: Arc<SeriesCache>) -> Self {
        Self { port, cache }
    }

    /// Loader with a private, empty cache.
    pub fn with_fresh_cache(port: P) -> Self {
        Self::new(port, Arc::new(SeriesCache::new()))
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Ticker symbols available in the archive, in file-name order.
    pub fn discover_tickers(&self) -> Result<Vec<String>, MarketWatchError> {
        let tickers = self.port.list_tickers()?;
        info!(count = tickers.len(), "discovered tickers");
        Ok(tickers)
    }

    /// Returns the cached series for `ticker`, reading and normalizing it on
    /// first use.
    pub fn load(&self, ticker: &str) -> Result<Arc<TickerSeries>, MarketWatchError> {
        if let Some(series) = self.cache.get(ticker) {
            debug!(ticker, "cache hit");
            return Ok(series);
        }

        let records = match self.port.read_records(ticker) {
            Ok(records) => records,
            Err(MarketWatchError::TickerNotFound { ticker, .. }) => {
                return Err(MarketWatchError::TickerNotFound {
                    ticker,
                    suggestions: self.suggestions(),
                });
            }
            Err(e) => return Err(e),
        };

        // Built outside the lock; only the finished series is published.
        let normalized = TickerSeries::from_records(ticker, records);
        if normalized.duplicates_dropped > 0 {
            warn!(
                ticker,
                dropped = normalized.duplicates_dropped,
                "duplicate dates dropped, first row kept"
            );
        }
        info!(ticker, records = normalized.series.len(), "loaded series");

        Ok(self.cache.insert_if_absent(ticker, normalized.series))
    }

    /// Loads each distinct ticker in request order. Tickers that fail are
    /// skipped with a warning; this never fails as a whole.
    pub fn load_many<T: AsRef<str>>(&self, tickers: &[T]) -> Vec<Arc<TickerSeries>> {
        let mut seen = HashSet::new();
        let mut loaded = Vec::new();

        for ticker in tickers.iter().map(AsRef::as_ref) {
            if !seen.insert(ticker) {
                continue;
            }
            match self.load(ticker) {
                Ok(series) => loaded.push(series),
                Err(e) => warn!(ticker, error = %e, "skipping ticker"),
            }
        }

        if loaded.len() < seen.len() {
            info!(
                loaded = loaded.len(),
                requested = seen.len(),
                "loaded a subset of the requested tickers"
            );
        }
        loaded
    }

    /// Loads every discovered ticker.
    pub fn load_all(&self) -> Result<Vec<Arc<TickerSeries>>, MarketWatchError> {
        let tickers = self.discover_tickers()?;
        Ok(self.load_many(tickers.as_slice()))
    }

    fn suggestions(&self) -> Vec<String> {
        match self.port.list_tickers() {
            Ok(mut tickers) => {
                tickers.truncate(MAX_SUGGESTIONS);
                tickers
            }
            Err(_) => Vec::new(),
        }
    }
}
