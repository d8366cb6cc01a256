//! Ticker universes: comma-separated ticker lists and named presets.

use std::collections::HashSet;
use tracing::warn;

/// A named ticker set, e.g. `Banks = JPM,BAC,GS,MS,BLK`.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub tickers: Vec<String>,
}

impl Preset {
    pub fn new(name: &str, tickers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.tickers.len()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// Splits on commas, trims and upper-cases each token. Empty tokens and
/// repeated tickers are rejected.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

pub fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset::new("FAANG", &["AAPL", "AMZN", "GOOGL", "META", "NVDA"]),
        Preset::new("Tech Giants", &["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA"]),
        Preset::new("Banks", &["JPM", "BAC", "GS", "MS", "BLK"]),
        Preset::new("All Sectors", &["AAPL", "JPM", "JNJ", "XOM", "AMZN", "BA"]),
    ]
}

/// Case-insensitive lookup; INI keys come back lower-cased.
pub fn find_preset<'a>(presets: &'a [Preset], name: &str) -> Result<&'a Preset, UniverseError> {
    presets
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| UniverseError::UnknownPreset(name.to_string()))
}

/// Keeps the first `max_compare` tickers.
pub fn limit_comparison(mut tickers: Vec<String>, max_compare: usize) -> Vec<String> {
    if tickers.len() > max_compare {
        warn!(
            requested = tickers.len(),
            max_compare, "too many tickers for one comparison, truncating"
        );
        tickers.truncate(max_compare);
    }
    tickers
}
