//! One user's view of the dashboard: a filter state plus the memoized views
//! derived from it.
//!
//! Every view is a pure function of the shared [`ObservationStore`] and the
//! session's [`FilterState`]. Mutations only advance the epoch; views are
//! recomputed lazily on the next read and cached under the epoch they were
//! computed for.

use crate::filter::error::InvalidSelection;
use crate::filter::state::{Epoch, FilterChange, FilterState, ThresholdBounds};
use crate::observations::store::ObservationStore;
use crate::views::cache::{ViewCache, ViewState, ViewValue};
use crate::views::error::ViewError;
use crate::views::geo_subset::{GeoPoint, GeoSubset};
use crate::views::snapshot::ViewSnapshot;
use crate::views::view_name::ViewName;
use bon::bon;
use log::{debug, warn};
use std::cell::RefCell;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rows scanned between two budget checks.
const BUDGET_CHECK_INTERVAL: usize = 256;

struct BudgetExceeded(Duration);

struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    fn start(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    fn check(&self, step: usize) -> Result<(), BudgetExceeded> {
        match self.budget {
            Some(budget)
                if step % BUDGET_CHECK_INTERVAL == 0 && self.started.elapsed() >= budget =>
            {
                Err(BudgetExceeded(budget))
            }
            _ => Ok(()),
        }
    }
}

/// An isolated filter state and view cache over a shared observation store.
///
/// Sessions never share mutable state: two sessions over the same store can
/// select different dates, stations and thresholds without affecting each
/// other. Reads take `&self`; the cache uses interior mutability, so a
/// `Session` is meant to be driven from one thread.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use windfield::{ObservationStore, RawObservation, ReferenceSet, Session, ThresholdBounds, ViewName};
///
/// let rows = vec![RawObservation::new("2024-01-01T12:00:00Z", 21.30, -157.90, 75.0, 12.0)];
/// let store = ObservationStore::load(rows, &ReferenceSet::hawaii_airfields()).into_store();
/// let mut session = Session::new(Arc::new(store), ThresholdBounds::default());
///
/// session
///     .on_filter_changed()
///     .date("Mon-Jan-01")
///     .stations(vec!["HNL".to_string()])
///     .threshold(10.0)
///     .call()
///     .unwrap();
///
/// assert_eq!(session.read(ViewName::AboveThreshold).unwrap().len(), 1);
/// assert!(session.read(ViewName::BelowThreshold).unwrap().is_empty());
/// ```
#[derive(Debug)]
pub struct Session {
    store: Arc<ObservationStore>,
    filter: FilterState,
    cache: RefCell<ViewCache>,
    recompute_budget: Option<Duration>,
}

#[bon]
impl Session {
    pub fn new(store: Arc<ObservationStore>, bounds: ThresholdBounds) -> Self {
        let filter = FilterState::new(&store, bounds);
        Self {
            store,
            filter,
            cache: RefCell::new(ViewCache::default()),
            recompute_budget: None,
        }
    }

    pub fn store(&self) -> &ObservationStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn epoch(&self) -> Epoch {
        self.filter.epoch()
    }

    pub fn recompute_budget(&self) -> Option<Duration> {
        self.recompute_budget
    }

    /// Limits how long one view recomputation may run. `None` disables the
    /// limit. Changing the budget is not a filter mutation.
    pub fn set_recompute_budget(&mut self, budget: Option<Duration>) {
        self.recompute_budget = budget;
    }

    /// Dates available for selection, in first-seen order.
    pub fn list_dates(&self) -> &[String] {
        self.store.dates_present()
    }

    /// Stations available for selection, in first-seen order.
    pub fn list_stations(&self) -> &[String] {
        self.store.stations_present()
    }

    pub fn set_date(&mut self, date: &str) -> Result<Epoch, InvalidSelection> {
        self.filter.set_date(date, &self.store)
    }

    pub fn set_stations<I, S>(&mut self, stations: I) -> Result<Epoch, InvalidSelection>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter.set_stations(stations, &self.store)
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<Epoch, InvalidSelection> {
        self.filter.set_threshold(threshold, &self.store)
    }

    /// Applies any combination of date, stations and threshold as a single
    /// mutation.
    ///
    /// Every supplied field is validated before any is applied, so either all
    /// of them take effect and the epoch advances once, or none do. A call
    /// with no fields leaves the epoch unchanged.
    #[builder]
    pub fn on_filter_changed(
        &mut self,
        #[builder(into)] date: Option<String>,
        stations: Option<Vec<String>>,
        threshold: Option<f64>,
    ) -> Result<Epoch, InvalidSelection> {
        let change = FilterChange {
            date,
            stations: stations.map(|stations| stations.into_iter().collect()),
            threshold,
        };
        self.filter.apply(change, &self.store)
    }

    /// Where `view` stands relative to the current epoch.
    pub fn state(&self, view: ViewName) -> ViewState {
        self.cache.borrow().state(view, self.filter.epoch())
    }

    /// Reads a derived view, recomputing it (and the base filter it depends
    /// on) if the cached value belongs to an older epoch.
    ///
    /// Two reads without a mutation in between return the same memoized
    /// value (see [`ViewSnapshot::is_same_value`]).
    ///
    /// # Errors
    ///
    /// [`ViewError::ComputationTimeout`] when a recompute budget is set and
    /// exceeded. The error carries the last value computed for the view, which
    /// belongs to an older epoch; the view itself stays stale.
    pub fn read(&self, view: ViewName) -> Result<ViewSnapshot, ViewError> {
        let value = self.value(view)?;
        Ok(ViewSnapshot::new(
            view,
            self.filter.epoch(),
            value.rows(),
            Arc::clone(&self.store),
        ))
    }

    /// The map representation of the base subset for the current epoch.
    pub fn geo_subset(&self) -> Result<Arc<GeoSubset>, ViewError> {
        match self.value(ViewName::GeoSubset)? {
            ViewValue::Geo(geo) => Ok(geo),
            ViewValue::Rows(_) => unreachable!("geoSubset is always cached as a geo value"),
        }
    }

    /// Drops cached values from older epochs. Returns how many were dropped.
    pub fn discard_stale(&mut self) -> usize {
        let epoch = self.filter.epoch();
        self.cache.get_mut().evict_stale(epoch)
    }

    fn value(&self, view: ViewName) -> Result<ViewValue, ViewError> {
        let epoch = self.filter.epoch();
        let cached = self.cache.borrow().fresh(view, epoch);
        if let Some(value) = cached {
            return Ok(value);
        }

        let base = match view {
            ViewName::DateStationFilter => None,
            _ => match self.value(ViewName::DateStationFilter) {
                Ok(base) => Some(base.rows()),
                Err(ViewError::ComputationTimeout { budget, .. }) => {
                    return Err(self.timeout(view, budget));
                }
            },
        };

        self.cache.borrow_mut().begin(view);
        let deadline = Deadline::start(self.recompute_budget);
        let computed = match (view, base) {
            (ViewName::AboveThreshold, Some(base)) => {
                self.threshold_partition(&base, true, &deadline).map(ViewValue::Rows)
            }
            (ViewName::BelowThreshold, Some(base)) => {
                self.threshold_partition(&base, false, &deadline).map(ViewValue::Rows)
            }
            (ViewName::GeoSubset, Some(base)) => self
                .geo_points(base, epoch, &deadline)
                .map(|geo| ViewValue::Geo(Arc::new(geo))),
            _ => self.date_station_filter(&deadline).map(ViewValue::Rows),
        };

        match computed {
            Ok(value) => {
                debug!(
                    "Recomputed view {} for epoch {}: {} rows in {:?}",
                    view,
                    epoch,
                    value.rows().len(),
                    deadline.started.elapsed()
                );
                self.cache.borrow_mut().commit(view, epoch, value.clone());
                Ok(value)
            }
            Err(BudgetExceeded(budget)) => {
                self.cache.borrow_mut().abort(view);
                warn!(
                    "Recomputing view {} for epoch {} exceeded the {:?} budget",
                    view, epoch, budget
                );
                Err(self.timeout(view, budget))
            }
        }
    }

    fn timeout(&self, view: ViewName, budget: Duration) -> ViewError {
        let stale = self.cache.borrow().last(view).map(|(epoch, value)| {
            Box::new(ViewSnapshot::new(
                view,
                epoch,
                value.rows(),
                Arc::clone(&self.store),
            ))
        });
        ViewError::ComputationTimeout {
            view,
            budget,
            stale,
        }
    }

    fn date_station_filter(&self, deadline: &Deadline) -> Result<Arc<[usize]>, BudgetExceeded> {
        let Some(date) = self.filter.selected_date() else {
            return Ok(Arc::from(Vec::new()));
        };
        let stations = self.filter.selected_stations();

        let mut rows = Vec::new();
        for (row, observation) in self.store.all().iter().enumerate() {
            deadline.check(row)?;
            if observation.date_label == date && stations.contains(&observation.station) {
                rows.push(row);
            }
        }
        Ok(rows.into())
    }

    fn threshold_partition(
        &self,
        base: &[usize],
        above: bool,
        deadline: &Deadline,
    ) -> Result<Arc<[usize]>, BudgetExceeded> {
        let threshold = self.filter.wind_threshold();

        let mut rows = Vec::new();
        for (step, row) in base.iter().enumerate() {
            deadline.check(step)?;
            if let Some(observation) = self.store.get(*row) {
                if (observation.wind_speed >= threshold) == above {
                    rows.push(*row);
                }
            }
        }
        Ok(rows.into())
    }

    fn geo_points(
        &self,
        base: Arc<[usize]>,
        epoch: Epoch,
        deadline: &Deadline,
    ) -> Result<GeoSubset, BudgetExceeded> {
        let threshold = self.filter.wind_threshold();

        let mut points = Vec::with_capacity(base.len());
        for (step, row) in base.iter().enumerate() {
            deadline.check(step)?;
            if let Some(observation) = self.store.get(*row) {
                points.push(GeoPoint::from_observation(*row, observation, threshold));
            }
        }
        Ok(GeoSubset::new(epoch, base, points))
    }
}
