//! Configuration validation.
//!
//! Runs on the merged settings (file plus command-line overrides) before any
//! data is loaded.

use crate::domain::error::MarketWatchError;
use crate::domain::settings::{DashboardConfig, MAX_LOOKBACK_DAYS};

pub fn validate_dashboard_config(config: &DashboardConfig) -> Result<(), MarketWatchError> {
    validate_archive(config)?;
    validate_ma_windows(config)?;
    validate_volatility_window(config)?;
    validate_risk_free_rate(config)?;
    validate_trading_days(config)?;
    validate_lookback(config)?;
    validate_max_compare(config)?;
    validate_alerts(config)?;
    Ok(())
}

fn validate_archive(config: &DashboardConfig) -> Result<(), MarketWatchError> {
    if config.archive_path.as_os_str().is_empty() {
        return Err(MarketWatchError::ConfigMissing {
            section: "archive".to_string(),
            key: "path".to_string(),
        });
    }
    if config.file_suffix.trim().is_empty() {
        return Err(MarketWatchError::ConfigInvalid {
            section: "archive".to_string(),
            key: "file_suffix".to_string(),
            reason: "file_suffix must not be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_ma_windows(config: &DashboardConfig) -> Result<(), MarketWatchError> {
    if config.ma_windows.is_empty() {
        return Err(MarketWatchError::ConfigMissing {
            section: "indicators".to_string(),
            key: "ma_windows".to_string(),
        });
    }
    if config.ma_windows.contains(&0) {
        return Err(MarketWatchError::ConfigInvalid {
            section: "indicators".to_string(),
            key: "ma_windows".to_string(),
            reason: "moving-average windows must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_volatility_window(config: &DashboardConfig) -> Result<(), MarketWatchError> {
    if config.volatility_window < 2 {
        return Err(MarketWatchError::ConfigInvalid {
            section: "indicators".to_string(),
            key: "volatility_window".to_string(),
            reason: "volatility_window must be at least 2".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(config: &DashboardConfig) -> Result<(), MarketWatchError> {
    let value = config.risk_free_rate;
    if !(0.0..1.0).contains(&value) {
        return Err(MarketWatchError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_trading_days(config: &DashboardConfig) -> Result<(), MarketWatchError> {
    let value = config.trading_days_per_year;
    if !value.is_finite() || value <= 0.0 {
        return Err(MarketWatchError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "trading_days_per_year".to_string(),
            reason: "trading_days_per_year must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_lookback(config: &DashboardConfig) -> Result<(), MarketWatchError> {
    if !(1..=MAX_LOOKBACK_DAYS).contains(&config.lookback_days) {
        return Err(MarketWatchError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "lookback_days".to_string(),
            reason: format!("lookback_days must be between 1 and {}", MAX_LOOKBACK_DAYS),
        });
    }
    Ok(())
}

fn validate_max_compare(config: &DashboardConfig) -> Result<(), MarketWatchError> {
    if config.max_compare < 1 {
        return Err(MarketWatchError::ConfigInvalid {
            section: "analysis".to_string(),
            key: "max_compare".to_string(),
            reason: "max_compare must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_alerts(config: &DashboardConfig) -> Result<(), MarketWatchError> {
    let thresholds = [
        ("high_volatility", config.alerts.high_volatility),
        ("extreme_return", config.alerts.extreme_return),
        ("low_correlation", config.alerts.low_correlation),
    ];
    for (key, value) in thresholds {
        if !value.is_finite() || value < 0.0 {
            return Err(MarketWatchError::ConfigInvalid {
                section: "alerts".to_string(),
                key: key.to_string(),
                reason: format!("{} must be non-negative", key),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn key_of(err: MarketWatchError) -> String {
        match err {
            MarketWatchError::ConfigInvalid { key, .. }
            | MarketWatchError::ConfigMissing { key, .. } => key,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_config_passes() {
        assert!(validate_dashboard_config(&DashboardConfig::default()).is_ok());
    }

    #[test]
    fn empty_archive_path_fails() {
        let config = DashboardConfig {
            archive_path: PathBuf::new(),
            ..DashboardConfig::default()
        };
        let err = validate_dashboard_config(&config).unwrap_err();
        assert!(matches!(err, MarketWatchError::ConfigMissing { ref key, .. } if key == "path"));
    }

    #[test]
    fn zero_ma_window_fails() {
        let config = DashboardConfig {
            ma_windows: vec![20, 0],
            ..DashboardConfig::default()
        };
        assert_eq!(key_of(validate_dashboard_config(&config).unwrap_err()), "ma_windows");
    }

    #[test]
    fn empty_ma_windows_fails() {
        let config = DashboardConfig {
            ma_windows: Vec::new(),
            ..DashboardConfig::default()
        };
        assert_eq!(key_of(validate_dashboard_config(&config).unwrap_err()), "ma_windows");
    }

    #[test]
    fn volatility_window_of_one_fails() {
        let config = DashboardConfig {
            volatility_window: 1,
            ..DashboardConfig::default()
        };
        assert_eq!(
            key_of(validate_dashboard_config(&config).unwrap_err()),
            "volatility_window"
        );
    }

    #[test]
    fn risk_free_rate_bounds() {
        for rate in [-0.01, 1.0, 1.5] {
            let config = DashboardConfig {
                risk_free_rate: rate,
                ..DashboardConfig::default()
            };
            assert_eq!(
                key_of(validate_dashboard_config(&config).unwrap_err()),
                "risk_free_rate"
            );
        }
        let zero = DashboardConfig {
            risk_free_rate: 0.0,
            ..DashboardConfig::default()
        };
        assert!(validate_dashboard_config(&zero).is_ok());
    }

    #[test]
    fn trading_days_must_be_positive() {
        let config = DashboardConfig {
            trading_days_per_year: 0.0,
            ..DashboardConfig::default()
        };
        assert_eq!(
            key_of(validate_dashboard_config(&config).unwrap_err()),
            "trading_days_per_year"
        );
    }

    #[test]
    fn lookback_days_bounds() {
        for days in [0, -30, MAX_LOOKBACK_DAYS + 1, 200_000_000] {
            let config = DashboardConfig {
                lookback_days: days,
                ..DashboardConfig::default()
            };
            assert_eq!(
                key_of(validate_dashboard_config(&config).unwrap_err()),
                "lookback_days"
            );
        }
        let widest = DashboardConfig {
            lookback_days: MAX_LOOKBACK_DAYS,
            ..DashboardConfig::default()
        };
        assert!(validate_dashboard_config(&widest).is_ok());
    }

    #[test]
    fn max_compare_zero_fails() {
        let config = DashboardConfig {
            max_compare: 0,
            ..DashboardConfig::default()
        };
        assert_eq!(key_of(validate_dashboard_config(&config).unwrap_err()), "max_compare");
    }

    #[test]
    fn negative_alert_threshold_fails() {
        let mut config = DashboardConfig::default();
        config.alerts.extreme_return = -0.1;
        assert_eq!(key_of(validate_dashboard_config(&config).unwrap_err()), "extreme_return");
    }
}
