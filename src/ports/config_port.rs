//! Configuration access port trait.

use crate::domain::error::MarketWatchError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// `default` when the key is absent; `ConfigInvalid` when it is present
    /// but not an integer.
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, MarketWatchError>;
    /// `default` when the key is absent; `ConfigInvalid` when it is present
    /// but not a number.
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, MarketWatchError>;
    /// Keys present in `section`, sorted. Empty when the section is absent.
    fn section_keys(&self, section: &str) -> Vec<String>;
}
