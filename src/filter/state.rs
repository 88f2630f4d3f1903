//! The user's current selection (date, stations, wind threshold) and the
//! epoch counter that versions it.

use crate::filter::error::{InvalidSelection, ThresholdBoundsError};
use crate::observations::store::ObservationStore;
use log::debug;
use std::collections::BTreeSet;
use std::fmt;

/// Version of a [`FilterState`]. Starts at zero and increases by exactly one
/// per accepted mutation. Compared by equality only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Epoch(self.0 + 1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allowed wind-threshold range (inclusive) and the value a session starts with.
///
/// The defaults mirror the dashboard's slider: 1 to 35 knots, starting at 5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdBounds {
    min: f64,
    max: f64,
    initial: f64,
}

impl ThresholdBounds {
    pub const DEFAULT_MIN: f64 = 1.0;
    pub const DEFAULT_MAX: f64 = 35.0;
    pub const DEFAULT_INITIAL: f64 = 5.0;

    pub fn new(min: f64, max: f64, initial: f64) -> Result<Self, ThresholdBoundsError> {
        let finite = min.is_finite() && max.is_finite() && initial.is_finite();
        if !finite || min > initial || initial > max {
            return Err(ThresholdBoundsError { min, max, initial });
        }
        Ok(Self { min, max, initial })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Default for ThresholdBounds {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
            initial: Self::DEFAULT_INITIAL,
        }
    }
}

/// A set of field updates applied as one mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChange {
    pub date: Option<String>,
    pub stations: Option<BTreeSet<String>>,
    pub threshold: Option<f64>,
}

impl FilterChange {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.stations.is_none() && self.threshold.is_none()
    }
}

/// Current selection of one session.
///
/// Mutations are validated against the observation store's domains and the
/// threshold bounds. Accepted mutations update the fields and advance the
/// epoch together; rejected ones leave everything untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    selected_date: Option<String>,
    selected_stations: BTreeSet<String>,
    wind_threshold: f64,
    bounds: ThresholdBounds,
    epoch: Epoch,
}

impl FilterState {
    /// Initial selection: the first date present, every station present, and
    /// the initial threshold. `selected_date` is `None` only for an empty store.
    pub fn new(store: &ObservationStore, bounds: ThresholdBounds) -> Self {
        Self {
            selected_date: store.dates_present().first().cloned(),
            selected_stations: store.stations_present().iter().cloned().collect(),
            wind_threshold: bounds.initial(),
            bounds,
            epoch: Epoch::default(),
        }
    }

    pub fn selected_date(&self) -> Option<&str> {
        self.selected_date.as_deref()
    }

    pub fn selected_stations(&self) -> &BTreeSet<String> {
        &self.selected_stations
    }

    pub fn wind_threshold(&self) -> f64 {
        self.wind_threshold
    }

    pub fn bounds(&self) -> ThresholdBounds {
        self.bounds
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn set_date(
        &mut self,
        date: &str,
        store: &ObservationStore,
    ) -> Result<Epoch, InvalidSelection> {
        self.apply(
            FilterChange {
                date: Some(date.to_string()),
                ..FilterChange::default()
            },
            store,
        )
    }

    pub fn set_stations<I, S>(
        &mut self,
        stations: I,
        store: &ObservationStore,
    ) -> Result<Epoch, InvalidSelection>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply(
            FilterChange {
                stations: Some(stations.into_iter().map(Into::into).collect()),
                ..FilterChange::default()
            },
            store,
        )
    }

    pub fn set_threshold(
        &mut self,
        threshold: f64,
        store: &ObservationStore,
    ) -> Result<Epoch, InvalidSelection> {
        self.apply(
            FilterChange {
                threshold: Some(threshold),
                ..FilterChange::default()
            },
            store,
        )
    }

    fn validate(
        &self,
        change: &FilterChange,
        store: &ObservationStore,
    ) -> Result<(), InvalidSelection> {
        if let Some(date) = &change.date {
            if !store.has_date(date) {
                return Err(InvalidSelection::UnknownDate(date.clone()));
            }
        }
        if let Some(stations) = &change.stations {
            let unknown: Vec<String> = stations
                .iter()
                .filter(|station| !store.has_station(station))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                return Err(InvalidSelection::UnknownStations(unknown));
            }
        }
        if let Some(threshold) = change.threshold {
            if !self.bounds.contains(threshold) {
                return Err(InvalidSelection::ThresholdOutOfRange {
                    value: threshold,
                    min: self.bounds.min(),
                    max: self.bounds.max(),
                });
            }
        }
        Ok(())
    }

    /// Validates every field of `change`, then applies them all and advances
    /// the epoch once. An empty change is not a mutation.
    pub fn apply(
        &mut self,
        change: FilterChange,
        store: &ObservationStore,
    ) -> Result<Epoch, InvalidSelection> {
        if change.is_empty() {
            return Ok(self.epoch);
        }
        self.validate(&change, store)?;

        if let Some(date) = change.date {
            self.selected_date = Some(date);
        }
        if let Some(stations) = change.stations {
            self.selected_stations = stations;
        }
        if let Some(threshold) = change.threshold {
            self.wind_threshold = threshold;
        }
        self.epoch = self.epoch.next();
        debug!(
            "Filter state advanced to epoch {} (date {:?}, {} stations, threshold {})",
            self.epoch,
            self.selected_date,
            self.selected_stations.len(),
            self.wind_threshold
        );
        Ok(self.epoch)
    }
}
