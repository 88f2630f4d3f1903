//! Names of the derived views and the edges between them.

use std::fmt;
use std::str::FromStr;

/// A derived view that consumers can read from a session.
///
/// `DateStationFilter` is the only view computed from the raw store; every
/// other view derives from it, so table and map consumers always agree on
/// the underlying subset.
///
/// # Examples
///
/// ```
/// use windfield::ViewName;
///
/// let view: ViewName = "aboveThreshold".parse().unwrap();
/// assert_eq!(view, ViewName::AboveThreshold);
/// assert_eq!(view.dependencies(), &[ViewName::DateStationFilter]);
/// assert_eq!(ViewName::GeoSubset.to_string(), "geoSubset");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewName {
    /// Observations on the selected date at one of the selected stations.
    DateStationFilter,
    /// Base subset with `wind_speed >= threshold`.
    AboveThreshold,
    /// Base subset with `wind_speed < threshold`.
    BelowThreshold,
    /// Base subset as point geometries for map rendering.
    GeoSubset,
}

impl ViewName {
    pub const ALL: [ViewName; 4] = [
        ViewName::DateStationFilter,
        ViewName::AboveThreshold,
        ViewName::BelowThreshold,
        ViewName::GeoSubset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewName::DateStationFilter => "dateStationFilter",
            ViewName::AboveThreshold => "aboveThreshold",
            ViewName::BelowThreshold => "belowThreshold",
            ViewName::GeoSubset => "geoSubset",
        }
    }

    /// Views this view is computed from.
    pub fn dependencies(&self) -> &'static [ViewName] {
        match self {
            ViewName::DateStationFilter => &[],
            ViewName::AboveThreshold | ViewName::BelowThreshold | ViewName::GeoSubset => {
                &[ViewName::DateStationFilter]
            }
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown view name '{0}'")]
pub struct UnknownViewName(pub String);

impl FromStr for ViewName {
    type Err = UnknownViewName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewName::ALL
            .into_iter()
            .find(|view| view.as_str() == s)
            .ok_or_else(|| UnknownViewName(s.to_string()))
    }
}
