use crate::filter::error::{InvalidSelection, ThresholdBoundsError};
use crate::observations::error::IngestError;
use crate::stations::error::StationError;
use crate::views::error::ViewError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindfieldError {
    #[error(transparent)]
    Station(#[from] StationError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    InvalidSelection(#[from] InvalidSelection),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    InvalidThresholdBounds(#[from] ThresholdBoundsError),

    #[error("Rejected {rejected} of {total} observation rows, more than the allowed {max_fraction} fraction")]
    MostlyMalformed {
        rejected: usize,
        total: usize,
        max_fraction: f64,
    },

    #[error("Allowed rejected fraction must be within [0, 1], got {0}")]
    InvalidRejectedFraction(f64),
}
