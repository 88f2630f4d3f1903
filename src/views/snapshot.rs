use crate::filter::state::Epoch;
use crate::observations::store::ObservationStore;
use crate::types::observation::Observation;
use crate::views::view_name::ViewName;
use std::fmt;
use std::sync::Arc;

/// The value of one derived view at one epoch.
///
/// A snapshot is cheap to clone and owns a handle to the store, so it stays
/// readable after the session moves on; its [`epoch`](ViewSnapshot::epoch)
/// says which filter state it was computed under.
#[derive(Clone)]
pub struct ViewSnapshot {
    view: ViewName,
    epoch: Epoch,
    rows: Arc<[usize]>,
    store: Arc<ObservationStore>,
}

impl ViewSnapshot {
    pub(crate) fn new(
        view: ViewName,
        epoch: Epoch,
        rows: Arc<[usize]>,
        store: Arc<ObservationStore>,
    ) -> Self {
        Self {
            view,
            epoch,
            rows,
            store,
        }
    }

    pub fn view(&self) -> ViewName {
        self.view
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Store indices of the observations in this view, ascending.
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> + '_ {
        self.rows.iter().filter_map(|row| self.store.get(*row))
    }

    pub fn to_vec(&self) -> Vec<Observation> {
        self.iter().cloned().collect()
    }

    /// True when both snapshots share the same memoized value.
    pub fn is_same_value(&self, other: &ViewSnapshot) -> bool {
        Arc::ptr_eq(&self.rows, &other.rows)
    }
}

impl fmt::Debug for ViewSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSnapshot")
            .field("view", &self.view)
            .field("epoch", &self.epoch)
            .field("rows", &self.rows)
            .finish()
    }
}

impl PartialEq for ViewSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.view == other.view && self.epoch == other.epoch && self.rows == other.rows
    }
}
