//! Export port trait for tabular results.

use crate::domain::comparison::{CorrelationMatrix, RiskReturnRow};
use crate::domain::error::MarketWatchError;
use crate::domain::indicator_helpers::AugmentedSeries;

/// Port for writing computed tables to the presentation layer.
pub trait ExportPort {
    fn write_series(&self, series: &AugmentedSeries) -> Result<(), MarketWatchError>;

    fn write_profile(&self, rows: &[RiskReturnRow]) -> Result<(), MarketWatchError>;

    fn write_correlation(&self, matrix: &CorrelationMatrix) -> Result<(), MarketWatchError>;
}
