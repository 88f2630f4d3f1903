use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StationError {
    #[error("Reference set is empty, nearest station is undefined")]
    EmptyReferenceSet,

    #[error("Reference code '{0}' appears more than once")]
    DuplicateCode(String),

    // Reference coordinates must be finite and within the geographic ranges
    #[error("Reference '{code}' has an invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { code: String, lat: f64, lon: f64 },
}
