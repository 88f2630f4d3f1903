//! Epoch-tagged memo table for derived views.

use crate::filter::state::Epoch;
use crate::views::geo_subset::GeoSubset;
use crate::views::view_name::ViewName;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Lifecycle of a view relative to the current epoch.
///
/// `Stale -> Computing -> Fresh`; every epoch advance sends all views back to
/// `Stale` without recomputing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// No value for the current epoch.
    Stale,
    /// Recomputation for the current epoch is in progress.
    Computing,
    /// Cached value was computed under the current epoch.
    Fresh,
}

#[derive(Debug, Clone)]
pub(crate) enum ViewValue {
    Rows(Arc<[usize]>),
    Geo(Arc<GeoSubset>),
}

impl ViewValue {
    pub(crate) fn rows(&self) -> Arc<[usize]> {
        match self {
            ViewValue::Rows(rows) => Arc::clone(rows),
            ViewValue::Geo(geo) => geo.rows(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    epoch: Epoch,
    value: ViewValue,
}

/// One entry per view, each tagged with the epoch it was computed under.
///
/// An entry from an older epoch is never served as fresh; it is superseded on
/// the next successful recompute.
#[derive(Debug, Default)]
pub(crate) struct ViewCache {
    entries: HashMap<ViewName, CacheEntry>,
    computing: HashSet<ViewName>,
}

impl ViewCache {
    /// The cached value, only if it was computed under `epoch`.
    pub(crate) fn fresh(&self, view: ViewName, epoch: Epoch) -> Option<ViewValue> {
        self.entries
            .get(&view)
            .filter(|entry| entry.epoch == epoch)
            .map(|entry| entry.value.clone())
    }

    /// The last value computed for `view`, whatever its epoch.
    pub(crate) fn last(&self, view: ViewName) -> Option<(Epoch, ViewValue)> {
        self.entries
            .get(&view)
            .map(|entry| (entry.epoch, entry.value.clone()))
    }

    pub(crate) fn state(&self, view: ViewName, epoch: Epoch) -> ViewState {
        if self.computing.contains(&view) {
            ViewState::Computing
        } else if self.fresh(view, epoch).is_some() {
            ViewState::Fresh
        } else {
            ViewState::Stale
        }
    }

    pub(crate) fn begin(&mut self, view: ViewName) {
        self.computing.insert(view);
    }

    pub(crate) fn commit(&mut self, view: ViewName, epoch: Epoch, value: ViewValue) {
        self.computing.remove(&view);
        self.entries.insert(view, CacheEntry { epoch, value });
    }

    /// Ends a failed recompute; the previous entry (if any) keeps its old epoch.
    pub(crate) fn abort(&mut self, view: ViewName) {
        self.computing.remove(&view);
    }

    /// Drops every entry not computed under `epoch`. Returns how many were dropped.
    pub(crate) fn evict_stale(&mut self, epoch: Epoch) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.epoch == epoch);
        before - self.entries.len()
    }
}
