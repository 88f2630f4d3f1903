use thiserror::Error;

/// A selection that falls outside the currently known domains.
///
/// Rejected selections never change the filter state or its epoch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidSelection {
    #[error("Date '{0}' is not present in the loaded observations")]
    UnknownDate(String),

    #[error("Stations {0:?} are not present in the loaded observations")]
    UnknownStations(Vec<String>),

    #[error("Wind threshold {value} is outside the allowed range [{min}, {max}]")]
    ThresholdOutOfRange { value: f64, min: f64, max: f64 },
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("Invalid threshold bounds: min {min}, max {max}, initial {initial} (need finite min <= initial <= max)")]
pub struct ThresholdBoundsError {
    pub min: f64,
    pub max: f64,
    pub initial: f64,
}
