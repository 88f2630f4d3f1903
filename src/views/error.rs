use crate::views::snapshot::ViewSnapshot;
use crate::views::view_name::ViewName;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewError {
    /// Recomputing `view` took longer than the session's recompute budget.
    ///
    /// `stale` holds the last value computed under an older epoch, if any.
    /// It is only ever handed out here, never as a regular read result.
    #[error("Recomputing view '{view}' exceeded the {budget:?} budget")]
    ComputationTimeout {
        view: ViewName,
        budget: Duration,
        stale: Option<Box<ViewSnapshot>>,
    },
}
