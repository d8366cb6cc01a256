//! Domain error types.

/// Top-level error type for marketwatch.
#[derive(Debug, thiserror::Error)]
pub enum MarketWatchError {
    #[error("archive directory not found: {path}")]
    ArchiveNotFound { path: String },

    #[error("no data for ticker {ticker}{}", format_suggestions(.suggestions))]
    TickerNotFound {
        ticker: String,
        suggestions: Vec<String>,
    },

    #[error("failed to read {file}: {reason}")]
    ArchiveRead { file: String, reason: String },

    #[error("insufficient history for {ticker}: have {observations} observations, need {minimum}")]
    InsufficientHistory {
        ticker: String,
        observations: usize,
        minimum: usize,
    },

    #[error("{metric} not computable for {ticker}: {reason}")]
    NotComputable {
        ticker: String,
        metric: String,
        reason: String,
    },

    #[error("comparison needs at least {minimum} tickers with usable data, have {usable}")]
    DegenerateComparison { usable: usize, minimum: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (available tickers: {}...)", suggestions.join(", "))
    }
}

impl From<&MarketWatchError> for std::process::ExitCode {
    fn from(err: &MarketWatchError) -> Self {
        let code: u8 = match err {
            MarketWatchError::Io(_) => 1,
            MarketWatchError::ConfigParse { .. }
            | MarketWatchError::ConfigMissing { .. }
            | MarketWatchError::ConfigInvalid { .. } => 2,
            MarketWatchError::ArchiveNotFound { .. }
            | MarketWatchError::TickerNotFound { .. }
            | MarketWatchError::ArchiveRead { .. } => 3,
            MarketWatchError::InsufficientHistory { .. }
            | MarketWatchError::NotComputable { .. }
            | MarketWatchError::DegenerateComparison { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
