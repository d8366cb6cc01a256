//! CLI integration tests for command orchestration.
//!
//! Tests cover:
//! - Settings loading from real INI files on disk
//! - Command-line overrides (indicator windows, ticker lists, presets)
//! - Date-range resolution for single tickers and batches
//! - Full command runs against a temporary CSV archive

mod common;

use clap::Parser;
use common::*;
use marketwatch::cli::{self, Cli};
use marketwatch::domain::config_validation::validate_dashboard_config;
use marketwatch::domain::error::MarketWatchError;
use marketwatch::domain::settings::DashboardConfig;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[archive]
path = /srv/market/archive

[indicators]
ma_windows = 10,20
volatility_window = 21

[analysis]
risk_free_rate = 0.03
max_compare = 3

[presets]
banks = JPM,BAC,GS,MS,BLK
tech = AAPL,MSFT
"#;

fn archive_with(tickers: &[(&str, Vec<f64>)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (ticker, closes) in tickers {
        write_archive_file(dir.path(), ticker, &records_from_closes("2024-01-01", closes));
    }
    dir
}

/// `ExitCode` has no `PartialEq`; compare the debug rendering instead.
fn assert_exit(actual: ExitCode, expected: ExitCode) {
    assert_eq!(format!("{actual:?}"), format!("{expected:?}"));
}

fn run_args(args: &[&str]) -> ExitCode {
    let mut argv = vec!["marketwatch", "--log-level", "off"];
    argv.extend_from_slice(args);
    cli::run(Cli::try_parse_from(argv).unwrap())
}

mod settings_loading {
    use super::*;

    #[test]
    fn no_config_gives_defaults() {
        let settings = cli::load_settings(None).unwrap();
        assert_eq!(settings, DashboardConfig::default());
    }

    #[test]
    fn reads_ini_from_disk() {
        let file = write_temp_ini(VALID_INI);
        let settings = cli::load_settings(Some(file.path())).unwrap();

        assert_eq!(settings.archive_path, PathBuf::from("/srv/market/archive"));
        assert_eq!(settings.ma_windows, vec![10, 20]);
        assert_eq!(settings.volatility_window, 21);
        assert_eq!(settings.risk_free_rate, 0.03);
        assert_eq!(settings.max_compare, 3);
        assert_eq!(settings.presets.len(), 2);
    }

    #[test]
    fn malformed_rate_is_rejected() {
        let file = write_temp_ini("[analysis]\nrisk_free_rate = lots\n");
        let err = cli::load_settings(Some(file.path())).unwrap_err();
        assert!(matches!(err, MarketWatchError::ConfigInvalid { ref key, .. } if key == "risk_free_rate"));
        assert_exit(ExitCode::from(&err), ExitCode::from(2));
    }

    #[test]
    fn oversized_lookback_is_rejected() {
        let file = write_temp_ini("[analysis]\nlookback_days = 200000000\n");
        let settings = cli::load_settings(Some(file.path())).unwrap();
        let err = validate_dashboard_config(&settings).unwrap_err();
        assert!(matches!(err, MarketWatchError::ConfigInvalid { ref key, .. } if key == "lookback_days"));
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = cli::load_settings(Some(std::path::Path::new("/nonexistent/marketwatch.ini")))
            .unwrap_err();
        assert!(matches!(err, MarketWatchError::ConfigParse { .. }));
        assert_exit(ExitCode::from(&err), ExitCode::from(2));
    }
}

mod overrides {
    use super::*;

    #[test]
    fn ma_and_window_override_file() {
        let mut settings = DashboardConfig::default();
        cli::apply_indicator_overrides(&mut settings, Some("5, 15"), Some(10)).unwrap();
        assert_eq!(settings.ma_windows, vec![5, 15]);
        assert_eq!(settings.volatility_window, 10);
    }

    #[test]
    fn bad_ma_list_is_rejected() {
        let mut settings = DashboardConfig::default();
        let err = cli::apply_indicator_overrides(&mut settings, Some("5,x"), None).unwrap_err();
        assert!(matches!(err, MarketWatchError::ConfigInvalid { key, .. } if key == "ma_windows"));
    }

    #[test]
    fn ticker_list_is_normalized() {
        let settings = DashboardConfig::default();
        let tickers = cli::resolve_comparison_tickers(Some(" aapl, msft "), None, &settings).unwrap();
        assert_eq!(tickers, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn duplicate_ticker_is_rejected() {
        let settings = DashboardConfig::default();
        let err = cli::resolve_comparison_tickers(Some("AAPL,aapl"), None, &settings).unwrap_err();
        assert!(matches!(err, MarketWatchError::ConfigInvalid { key, .. } if key == "tickers"));
    }

    #[test]
    fn preset_is_truncated_to_max_compare() {
        let file = write_temp_ini(VALID_INI);
        let settings = cli::load_settings(Some(file.path())).unwrap();
        let tickers = cli::resolve_comparison_tickers(None, Some("Banks"), &settings).unwrap();
        assert_eq!(tickers, vec!["JPM", "BAC", "GS"]);
    }

    #[test]
    fn builtin_preset_lookup() {
        let settings = DashboardConfig::default();
        let tickers = cli::resolve_comparison_tickers(None, Some("faang"), &settings).unwrap();
        assert_eq!(tickers, vec!["AAPL", "AMZN", "GOOGL", "META", "NVDA"]);
    }

    #[test]
    fn unknown_preset_is_rejected() {
        let settings = DashboardConfig::default();
        assert!(cli::resolve_comparison_tickers(None, Some("crypto"), &settings).is_err());
    }
}

mod ranges {
    use super::*;

    #[test]
    fn resolve_range_defaults_to_full_series() {
        let series = series_from_closes("A", "2024-01-01", &[1.0, 2.0, 3.0]);
        assert_eq!(
            cli::resolve_range(&series, None, None),
            Some((date(2024, 1, 1), date(2024, 1, 3)))
        );
        assert_eq!(
            cli::resolve_range(&series, Some(date(2024, 1, 2)), None),
            Some((date(2024, 1, 2), date(2024, 1, 3)))
        );
    }

    #[test]
    fn resolve_range_empty_series() {
        let series = series_from_closes("A", "2024-01-01", &[]);
        assert_eq!(cli::resolve_range(&series, None, None), None);
    }

    #[test]
    fn batch_range_uses_lookback_from_latest() {
        let data = vec![
            series_from_closes("A", "2024-01-01", &[1.0; 40]),
            series_from_closes("B", "2024-01-11", &[1.0; 40]),
        ];
        // Latest date is 2024-02-19.
        assert_eq!(
            cli::batch_range(&data, 10, None, None),
            Some((date(2024, 2, 9), date(2024, 2, 19)))
        );
        // Lookback is clamped to the earliest record.
        assert_eq!(
            cli::batch_range(&data, 365, None, None),
            Some((date(2024, 1, 1), date(2024, 2, 19)))
        );
    }

    #[test]
    fn batch_range_with_oversized_lookback_reaches_earliest() {
        let data = vec![
            series_from_closes("A", "2024-01-01", &[1.0; 40]),
            series_from_closes("B", "2024-01-11", &[1.0; 40]),
        ];
        for lookback in [200_000_000, i64::MAX] {
            assert_eq!(
                cli::batch_range(&data, lookback, None, None),
                Some((date(2024, 1, 1), date(2024, 2, 19)))
            );
        }
    }
}

mod commands {
    use super::*;

    #[test]
    fn tickers_command_succeeds() {
        let dir = archive_with(&[("AAPL", vec![1.0, 2.0])]);
        let archive = dir.path().to_str().unwrap();
        assert_exit(run_args(&["--archive", archive, "tickers"]), ExitCode::SUCCESS);
    }

    #[test]
    fn tickers_command_missing_archive() {
        assert_exit(
            run_args(&["--archive", "/nonexistent/marketwatch", "tickers"]),
            ExitCode::from(3)
        );
    }

    #[test]
    fn summary_unknown_ticker_exits_with_archive_code() {
        let dir = archive_with(&[("AAPL", vec![1.0, 2.0])]);
        let archive = dir.path().to_str().unwrap();
        assert_exit(
            run_args(&["--archive", archive, "summary", "--ticker", "NOPE"]),
            ExitCode::from(3)
        );
    }

    #[test]
    fn indicators_command_writes_csv() {
        let dir = archive_with(&[("AAPL", generate_closes(40, 100.0, 0.5))]);
        let archive = dir.path().to_str().unwrap();
        let output = dir.path().join("aapl_indicators.csv");

        let code = run_args(&[
            "--archive",
            archive,
            "indicators",
            "--ticker",
            "AAPL",
            "--ma",
            "5,10",
            "--window",
            "7",
            "--output",
            output.to_str().unwrap(),
        ]);

        assert_exit(code, ExitCode::SUCCESS);
        let content = std::fs::read_to_string(&output).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Open,High,Low,Close,Volume,Ticker,Daily_Ret,Cum_Ret,MA5,MA10,Volatility_7"
        );
        assert_eq!(lines.count(), 40);
    }

    #[test]
    fn invalid_window_override_exits_with_config_code() {
        let dir = archive_with(&[("AAPL", vec![1.0, 2.0])]);
        let archive = dir.path().to_str().unwrap();
        let code = run_args(&[
            "--archive", archive, "indicators", "--ticker", "AAPL", "--window", "1",
        ]);
        assert_exit(code, ExitCode::from(2));
    }

    #[test]
    fn compare_writes_profile_csv() {
        let dir = archive_with(&[
            ("UP", generate_closes(60, 10.0, 0.5)),
            ("DOWN", generate_closes(60, 80.0, -0.5)),
        ]);
        let archive = dir.path().to_str().unwrap();
        let output = dir.path().join("profile.csv");

        let code = run_args(&[
            "--archive",
            archive,
            "compare",
            "--tickers",
            "up,down,nope",
            "--output",
            output.to_str().unwrap(),
        ]);

        assert_exit(code, ExitCode::SUCCESS);
        let content = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Ticker,Risk,Annual_Return,Sharpe");
        assert!(lines[1].starts_with("UP,"));
        assert!(lines[2].starts_with("DOWN,"));
    }

    #[test]
    fn compare_with_one_usable_ticker_falls_back() {
        let dir = archive_with(&[("UP", generate_closes(30, 10.0, 0.5))]);
        let archive = dir.path().to_str().unwrap();
        assert_exit(
            run_args(&["--archive", archive, "compare", "--tickers", "UP,NOPE"]),
            ExitCode::SUCCESS
        );
    }

    #[test]
    fn compare_with_nothing_loaded_is_degenerate() {
        let dir = archive_with(&[("UP", vec![1.0, 2.0])]);
        let archive = dir.path().to_str().unwrap();
        assert_exit(
            run_args(&["--archive", archive, "compare", "--tickers", "NOPE,GONE"]),
            ExitCode::from(5)
        );
    }

    #[test]
    fn compare_requires_tickers_or_preset() {
        assert!(Cli::try_parse_from(["marketwatch", "compare"]).is_err());
        assert!(
            Cli::try_parse_from(["marketwatch", "compare", "--tickers", "A,B", "--preset", "Banks"])
                .is_err()
        );
    }

    #[test]
    fn check_flags_suspect_data() {
        let dir = TempDir::new().unwrap();
        let mut records = records_from_closes("2024-01-01", &[10.0; 10]);
        for r in records.iter_mut().take(3) {
            r.volume = 0;
        }
        write_archive_file(dir.path(), "THIN", &records);
        write_archive_file(
            dir.path(),
            "GOOD",
            &records_from_closes("2024-01-01", &[10.0; 10]),
        );
        let archive = dir.path().to_str().unwrap();

        assert_exit(
            run_args(&["--archive", archive, "check", "--ticker", "GOOD"]),
            ExitCode::SUCCESS
        );
        assert_exit(
            run_args(&["--archive", archive, "check", "--ticker", "THIN"]),
            ExitCode::from(cli::EXIT_INTEGRITY_FAILED)
        );
    }
}
