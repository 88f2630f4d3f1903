mod dashboard;
mod error;
mod filter;
mod observations;
mod session;
mod stations;
mod types;
mod views;

pub use dashboard::*;
pub use error::WindfieldError;
pub use session::Session;

pub use stations::locate_station::{assign, great_circle_km, NearestReference};
pub use stations::reference::{ReferenceLocation, ReferenceSet, HAWAII_AIRFIELDS};

pub use types::lat_lon::LatLon;
pub use types::observation::{Observation, RawObservation};
pub use types::timestamp::{date_label, parse_timestamp, IntoUtcDateTime, DATE_LABEL_FORMAT};

pub use observations::csv_source::{read_observations_csv, CsvLayout};
pub use observations::store::{LoadReport, ObservationStore};

pub use filter::state::{Epoch, FilterChange, FilterState, ThresholdBounds};

pub use views::cache::ViewState;
pub use views::geo_subset::{GeoPoint, GeoSubset, MapBounds, MarkerColor};
pub use views::snapshot::ViewSnapshot;
pub use views::view_name::{UnknownViewName, ViewName};

pub use filter::error::{InvalidSelection, ThresholdBoundsError};
pub use observations::error::{IngestError, MalformedRecord, RejectedRecord};
pub use stations::error::StationError;
pub use views::error::ViewError;
