use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single raw row was excluded from the store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MalformedRecord {
    #[error("Required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("Timestamp '{0}' is not a recognised ISO-8601 datetime")]
    InvalidTimestamp(String),

    #[error("Field '{field}' is not finite ({value})")]
    NonFiniteValue { field: &'static str, value: f64 },

    #[error("Coordinate ({lat}, {lon}) is outside the valid latitude/longitude range")]
    CoordinateOutOfRange { lat: f64, lon: f64 },
}

/// A rejected row: its position in the input sequence and the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub index: usize,
    pub reason: MalformedRecord,
}

/// Whole-file failures while reading an observation export.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Observation file '{0}' does not exist")]
    FileNotFound(PathBuf),

    #[error("Failed to read observation CSV '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{column}' is not available in '{path}'")]
    ColumnNotFound {
        path: PathBuf,
        column: String,
        #[source]
        source: PolarsError,
    },
}
