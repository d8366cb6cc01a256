//! Core domain types and logic.

pub mod alerts;
pub mod archive;
pub mod comparison;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod indicator_helpers;
pub mod integrity;
pub mod metrics;
pub mod ohlcv;
pub mod settings;
pub mod stats;
pub mod universe;
