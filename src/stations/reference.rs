//! Defines the named anchor points that observations are classified against,
//! and the validated, ordered set that holds them.

use crate::stations::error::StationError;
use crate::types::lat_lon::LatLon;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named geographic anchor point, typically an airfield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLocation {
    /// Unique short code (e.g., "HNL").
    pub code: String,
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub lat: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub lon: f64,
}

impl ReferenceLocation {
    pub fn new(code: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            code: code.into(),
            lat,
            lon,
        }
    }

    pub fn location(&self) -> LatLon {
        LatLon(self.lat, self.lon)
    }
}

/// The five Hawaiian airfields the wind dashboard was built around.
pub const HAWAII_AIRFIELDS: [(&str, f64, f64); 5] = [
    ("HNL", 21.3187, -157.9225),
    ("OGG", 20.8986, -156.4305),
    ("LIH", 21.9750, -159.3380),
    ("KOA", 19.7388, -156.0456),
    ("ITO", 19.7203, -155.0485),
];

/// An ordered, non-empty set of [`ReferenceLocation`]s with unique codes.
///
/// Iteration order is the order the locations were supplied in. That order is
/// significant: it decides ties in [`ReferenceSet::assign`].
///
/// # Examples
///
/// ```
/// use windfield::ReferenceSet;
///
/// let references = ReferenceSet::hawaii_airfields();
/// assert_eq!(references.len(), 5);
/// assert_eq!(references.codes().next(), Some("HNL"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSet {
    locations: Vec<ReferenceLocation>,
}

impl ReferenceSet {
    /// Builds a reference set, validating it up front.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::EmptyReferenceSet`] if `locations` is empty,
    /// [`StationError::DuplicateCode`] if two locations share a code, and
    /// [`StationError::InvalidCoordinate`] if a coordinate is non-finite or out of range.
    pub fn new(locations: Vec<ReferenceLocation>) -> Result<Self, StationError> {
        if locations.is_empty() {
            return Err(StationError::EmptyReferenceSet);
        }

        let mut seen = HashSet::with_capacity(locations.len());
        for location in &locations {
            if !location.location().is_valid() {
                return Err(StationError::InvalidCoordinate {
                    code: location.code.clone(),
                    lat: location.lat,
                    lon: location.lon,
                });
            }
            if !seen.insert(location.code.as_str()) {
                return Err(StationError::DuplicateCode(location.code.clone()));
            }
        }

        Ok(Self { locations })
    }

    /// The built-in Hawaiian airfield set (HNL, OGG, LIH, KOA, ITO, in that order).
    pub fn hawaii_airfields() -> Self {
        Self {
            locations: HAWAII_AIRFIELDS
                .iter()
                .map(|(code, lat, lon)| ReferenceLocation::new(*code, *lat, *lon))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    // Always false; construction rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceLocation> {
        self.locations.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.locations.iter().map(|location| location.code.as_str())
    }

    pub fn get(&self, code: &str) -> Option<&ReferenceLocation> {
        self.locations.iter().find(|location| location.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub(crate) fn as_slice(&self) -> &[ReferenceLocation] {
        &self.locations
    }
}

impl Default for ReferenceSet {
    fn default() -> Self {
        Self::hawaii_airfields()
    }
}
