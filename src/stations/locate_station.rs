//! Nearest-station classification.
//!
//! Reference sets are small (a handful of airfields), so classification is a
//! brute-force scan using the haversine great-circle distance. Ties are broken
//! in favour of the reference that appears first in the set's iteration order.

use crate::stations::error::StationError;
use crate::stations::reference::{ReferenceLocation, ReferenceSet};
use haversine::{distance, Location as HaversineLocation, Units};
use log::debug;
use ordered_float::OrderedFloat;

/// The reference chosen for a coordinate, with its great-circle distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestReference<'a> {
    pub reference: &'a ReferenceLocation,
    pub distance_km: f64,
}

// Helper struct for ordering candidates by distance, then by position in the set
#[derive(Clone, Copy)]
struct ReferenceCandidate<'a> {
    distance_km: OrderedFloat<f64>,
    position: usize,
    reference: &'a ReferenceLocation,
}

impl ReferenceCandidate<'_> {
    fn sort_key(&self) -> (OrderedFloat<f64>, usize) {
        (self.distance_km, self.position)
    }
}

/// Great-circle distance between two coordinates in kilometres.
pub fn great_circle_km(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    distance(
        HaversineLocation {
            latitude: lat_a,
            longitude: lon_a,
        },
        HaversineLocation {
            latitude: lat_b,
            longitude: lon_b,
        },
        Units::Kilometers,
    )
}

fn nearest_in<'a>(
    lat: f64,
    lon: f64,
    references: &'a [ReferenceLocation],
) -> Option<NearestReference<'a>> {
    let mut candidates = references
        .iter()
        .enumerate()
        .map(|(position, reference)| ReferenceCandidate {
            distance_km: OrderedFloat(great_circle_km(lat, lon, reference.lat, reference.lon)),
            position,
            reference,
        });

    let first = candidates.next()?;
    let mut best = first;
    let mut tied = false;
    for candidate in candidates {
        if candidate.distance_km == best.distance_km {
            tied = true;
        }
        if candidate.sort_key() < best.sort_key() {
            tied = false;
            best = candidate;
        }
    }

    if tied {
        debug!(
            "({}, {}) is equidistant from several references, keeping '{}'",
            lat, lon, best.reference.code
        );
    }

    Some(NearestReference {
        reference: best.reference,
        distance_km: best.distance_km.into_inner(),
    })
}

/// Returns the code of the reference nearest to `(lat, lon)`.
///
/// Works on any slice of references, including an unvalidated one.
///
/// # Errors
///
/// Returns [`StationError::EmptyReferenceSet`] if `references` is empty.
///
/// # Examples
///
/// ```
/// use windfield::{assign, ReferenceLocation};
///
/// let references = vec![
///     ReferenceLocation::new("WEST", 0.0, -1.0),
///     ReferenceLocation::new("EAST", 0.0, 1.0),
/// ];
/// assert_eq!(assign(0.0, 0.8, &references).unwrap(), "EAST");
/// // Equidistant: the first reference in the slice wins.
/// assert_eq!(assign(0.0, 0.0, &references).unwrap(), "WEST");
/// ```
pub fn assign(lat: f64, lon: f64, references: &[ReferenceLocation]) -> Result<&str, StationError> {
    nearest_in(lat, lon, references)
        .map(|nearest| nearest.reference.code.as_str())
        .ok_or(StationError::EmptyReferenceSet)
}

impl ReferenceSet {
    /// Finds the reference nearest to `(lat, lon)` along with its distance.
    ///
    /// Infallible because a `ReferenceSet` is never empty.
    pub fn nearest(&self, lat: f64, lon: f64) -> NearestReference<'_> {
        match nearest_in(lat, lon, self.as_slice()) {
            Some(nearest) => nearest,
            // Construction guarantees at least one reference.
            None => unreachable!("ReferenceSet is never empty"),
        }
    }

    /// Returns the code of the reference nearest to `(lat, lon)`.
    ///
    /// Ties (equal distances) go to the reference that appears first in the set.
    pub fn assign(&self, lat: f64, lon: f64) -> &str {
        self.nearest(lat, lon).reference.code.as_str()
    }
}
