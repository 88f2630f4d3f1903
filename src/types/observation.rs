//! Observation records: the raw row handed over by ingestion, and the
//! classified, immutable record the rest of the crate works with.

use crate::types::lat_lon::LatLon;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unvalidated row from an observation feed.
///
/// Every field is optional so that a row with missing cells can still be
/// represented and rejected individually during loading. Field names accept
/// both the canonical names and the column names used by the Meteomatics
/// export (`validdate`, `t_2m:F`, `wind_speed_10m:kn`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(alias = "validdate", default)]
    pub timestamp: Option<String>,
    #[serde(alias = "latitude", default)]
    pub lat: Option<f64>,
    #[serde(alias = "longitude", default)]
    pub lon: Option<f64>,
    /// Air temperature at 2 m, in °F.
    #[serde(alias = "t_2m:F", default)]
    pub temperature: Option<f64>,
    /// Wind speed at 10 m, in knots.
    #[serde(alias = "wind_speed_10m:kn", default)]
    pub wind_speed: Option<f64>,
}

impl RawObservation {
    pub fn new(
        timestamp: impl Into<String>,
        lat: f64,
        lon: f64,
        temperature: f64,
        wind_speed: f64,
    ) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            lat: Some(lat),
            lon: Some(lon),
            temperature: Some(temperature),
            wind_speed: Some(wind_speed),
        }
    }
}

/// A validated observation assigned to its nearest reference station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    /// Air temperature at 2 m, in °F.
    pub temperature: f64,
    /// Wind speed at 10 m, in knots.
    pub wind_speed: f64,
    /// Weekday-month-day label of the UTC date (e.g. `Mon-Jan-01`).
    pub date_label: String,
    /// Code of the nearest reference station.
    pub station: String,
}

impl Observation {
    pub fn location(&self) -> LatLon {
        LatLon(self.lat, self.lon)
    }
}
