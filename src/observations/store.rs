//! The observation store: raw rows validated, labelled and classified once at
//! load time, then shared read-only for the life of the process.

use crate::observations::error::{MalformedRecord, RejectedRecord};
use crate::stations::reference::ReferenceSet;
use crate::types::lat_lon::LatLon;
use crate::types::observation::{Observation, RawObservation};
use crate::types::timestamp::{date_label, parse_timestamp};
use log::{info, warn};
use std::collections::HashSet;

/// Immutable collection of classified observations.
///
/// Built with [`ObservationStore::load`]; there is no way to mutate it afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationStore {
    observations: Vec<Observation>,
    dates: Vec<String>,
    stations: Vec<String>,
}

/// Outcome of [`ObservationStore::load`]: the store built from the accepted
/// rows, plus every rejected row and the reason it was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub store: ObservationStore,
    pub rejected: Vec<RejectedRecord>,
}

impl LoadReport {
    pub fn accepted_count(&self) -> usize {
        self.store.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    pub fn total_count(&self) -> usize {
        self.accepted_count() + self.rejected_count()
    }

    /// Fraction of input rows that were rejected, `0.0` for an empty input.
    pub fn rejected_fraction(&self) -> f64 {
        let total = self.total_count();
        if total == 0 {
            0.0
        } else {
            self.rejected_count() as f64 / total as f64
        }
    }

    /// True when more rows were rejected than accepted.
    pub fn is_majority_rejected(&self) -> bool {
        self.rejected_count() > self.accepted_count()
    }

    pub fn into_store(self) -> ObservationStore {
        self.store
    }
}

fn require(value: Option<f64>, field: &'static str) -> Result<f64, MalformedRecord> {
    let value = value.ok_or(MalformedRecord::MissingField(field))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MalformedRecord::NonFiniteValue { field, value })
    }
}

/// Validates one raw row and classifies it against `references`.
fn classify(raw: RawObservation, references: &ReferenceSet) -> Result<Observation, MalformedRecord> {
    let timestamp_raw = raw
        .timestamp
        .ok_or(MalformedRecord::MissingField("timestamp"))?;
    let lat = require(raw.lat, "lat")?;
    let lon = require(raw.lon, "lon")?;
    let temperature = require(raw.temperature, "temperature")?;
    let wind_speed = require(raw.wind_speed, "wind_speed")?;

    if !LatLon(lat, lon).is_valid() {
        return Err(MalformedRecord::CoordinateOutOfRange { lat, lon });
    }
    let timestamp = parse_timestamp(&timestamp_raw)
        .ok_or(MalformedRecord::InvalidTimestamp(timestamp_raw))?;

    Ok(Observation {
        date_label: date_label(&timestamp),
        station: references.assign(lat, lon).to_string(),
        timestamp,
        lat,
        lon,
        temperature,
        wind_speed,
    })
}

impl ObservationStore {
    /// Parses, labels and classifies raw rows.
    ///
    /// The classifier runs exactly once per accepted row. Malformed rows are
    /// excluded and reported in [`LoadReport::rejected`]; they never abort the
    /// load. Whether a mostly-rejected load is acceptable is the caller's call.
    pub fn load<I>(raw_records: I, references: &ReferenceSet) -> LoadReport
    where
        I: IntoIterator<Item = RawObservation>,
    {
        let mut observations = Vec::new();
        let mut rejected = Vec::new();

        for (index, raw) in raw_records.into_iter().enumerate() {
            match classify(raw, references) {
                Ok(observation) => observations.push(observation),
                Err(reason) => {
                    warn!("Rejected observation row {}: {}", index, reason);
                    rejected.push(RejectedRecord { index, reason });
                }
            }
        }

        let store = Self::from_observations(observations);
        info!(
            "Loaded {} observations ({} dates, {} stations), rejected {} rows",
            store.len(),
            store.dates.len(),
            store.stations.len(),
            rejected.len()
        );
        LoadReport { store, rejected }
    }

    fn from_observations(observations: Vec<Observation>) -> Self {
        let mut dates = Vec::new();
        let mut stations = Vec::new();
        let mut seen_dates = HashSet::new();
        let mut seen_stations = HashSet::new();

        for observation in &observations {
            if seen_dates.insert(observation.date_label.as_str()) {
                dates.push(observation.date_label.clone());
            }
            if seen_stations.insert(observation.station.as_str()) {
                stations.push(observation.station.clone());
            }
        }

        Self {
            observations,
            dates,
            stations,
        }
    }

    pub fn all(&self) -> &[Observation] {
        &self.observations
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.observations.get(index)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct date labels, in first-seen order.
    pub fn dates_present(&self) -> &[String] {
        &self.dates
    }

    /// Distinct station codes, in first-seen order.
    pub fn stations_present(&self) -> &[String] {
        &self.stations
    }

    pub fn has_date(&self, date: &str) -> bool {
        self.dates.iter().any(|known| known == date)
    }

    pub fn has_station(&self, station: &str) -> bool {
        self.stations.iter().any(|known| known == station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hawaii() -> ReferenceSet {
        ReferenceSet::hawaii_airfields()
    }

    #[test]
    fn test_load_classifies_and_labels() {
        let report = ObservationStore::load(
            vec![
                RawObservation::new("2024-01-01T12:00:00Z", 21.30, -157.90, 75.0, 12.0),
                RawObservation::new("2024-01-02T00:05:00Z", 20.90, -156.43, 71.5, 4.0),
            ],
            &hawaii(),
        );

        assert!(report.rejected.is_empty());
        let all = report.store.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].station, "HNL");
        assert_eq!(all[0].date_label, "Mon-Jan-01");
        assert_eq!(all[1].station, "OGG");
        assert_eq!(all[1].date_label, "Tue-Jan-02");
    }

    #[test]
    fn test_distinct_dates_and_stations_keep_first_seen_order() {
        let report = ObservationStore::load(
            vec![
                RawObservation::new("2024-01-02T10:00:00Z", 21.97, -159.33, 70.0, 3.0),
                RawObservation::new("2024-01-01T10:00:00Z", 21.30, -157.90, 70.0, 3.0),
                RawObservation::new("2024-01-02T11:00:00Z", 21.30, -157.90, 70.0, 3.0),
                RawObservation::new("2024-01-01T11:00:00Z", 21.97, -159.33, 70.0, 3.0),
            ],
            &hawaii(),
        );
        let store = report.into_store();
        assert_eq!(store.dates_present(), ["Tue-Jan-02", "Mon-Jan-01"]);
        assert_eq!(store.stations_present(), ["LIH", "HNL"]);
        assert!(store.has_date("Mon-Jan-01"));
        assert!(!store.has_station("KOA"));
    }

    #[test]
    fn test_malformed_rows_are_rejected_not_fatal() {
        let mut missing_wind = RawObservation::new("2024-01-01T12:00:00Z", 21.3, -157.9, 75.0, 0.0);
        missing_wind.wind_speed = None;

        let report = ObservationStore::load(
            vec![
                RawObservation::new("2024-01-01T12:00:00Z", 21.30, -157.90, 75.0, 12.0),
                missing_wind,
                RawObservation::new("2024-01-01T12:00:00Z", f64::NAN, -157.90, 75.0, 12.0),
                RawObservation::new("not a date", 21.30, -157.90, 75.0, 12.0),
                RawObservation::new("2024-01-01T12:00:00Z", 21.30, -157.90, 75.0, f64::INFINITY),
                RawObservation::new("2024-01-01T12:00:00Z", 121.30, -157.90, 75.0, 12.0),
                RawObservation::default(),
            ],
            &hawaii(),
        );

        assert_eq!(report.accepted_count(), 1);
        assert_eq!(report.rejected_count(), 6);
        assert!(report.is_majority_rejected());
        assert!((report.rejected_fraction() - 6.0 / 7.0).abs() < 1e-12);

        let reasons: Vec<_> = report.rejected.iter().map(|r| (r.index, r.reason.clone())).collect();
        assert_eq!(reasons[0], (1, MalformedRecord::MissingField("wind_speed")));
        assert!(matches!(
            reasons[1],
            (2, MalformedRecord::NonFiniteValue { field: "lat", .. })
        ));
        assert_eq!(
            reasons[2],
            (3, MalformedRecord::InvalidTimestamp("not a date".to_string()))
        );
        assert!(matches!(
            reasons[3],
            (4, MalformedRecord::NonFiniteValue { field: "wind_speed", .. })
        ));
        assert!(matches!(
            reasons[4],
            (5, MalformedRecord::CoordinateOutOfRange { .. })
        ));
        assert_eq!(reasons[5], (6, MalformedRecord::MissingField("timestamp")));
    }

    #[test]
    fn test_empty_input_gives_empty_store() {
        let report = ObservationStore::load(Vec::new(), &hawaii());
        assert!(report.store.is_empty());
        assert!(report.store.dates_present().is_empty());
        assert_eq!(report.rejected_fraction(), 0.0);
        assert!(!report.is_majority_rejected());
    }
}
