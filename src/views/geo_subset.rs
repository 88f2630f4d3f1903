//! Point-geometry form of the base filtered subset, for map consumers.
//!
//! A `GeoSubset` is always built from the `dateStationFilter` rows of the same
//! epoch; it is a different representation of that subset, never a separate
//! filter. Points are indexed in an R-tree for click lookups.

use crate::filter::state::Epoch;
use crate::stations::locate_station::great_circle_km;
use crate::types::lat_lon::LatLon;
use crate::types::observation::Observation;
use ordered_float::OrderedFloat;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Marker color for a point: red at or above the wind threshold, green below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Red,
    Green,
}

impl MarkerColor {
    pub fn for_wind(wind_speed: f64, threshold: f64) -> Self {
        if wind_speed < threshold {
            MarkerColor::Green
        } else {
            MarkerColor::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerColor::Red => "red",
            MarkerColor::Green => "green",
        }
    }
}

/// One observation as a map point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    /// Index of the observation in the store.
    pub row: usize,
    pub location: LatLon,
    pub station: String,
    pub date_label: String,
    pub temperature: f64,
    pub wind_speed: f64,
    pub marker: MarkerColor,
}

impl GeoPoint {
    pub fn from_observation(row: usize, observation: &Observation, threshold: f64) -> Self {
        Self {
            row,
            location: observation.location(),
            station: observation.station.clone(),
            date_label: observation.date_label.clone(),
            temperature: observation.temperature,
            wind_speed: observation.wind_speed,
            marker: MarkerColor::for_wind(observation.wind_speed, threshold),
        }
    }
}

impl RTreeObject for GeoPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.lat(), self.location.lon()])
    }
}

impl PointDistance for GeoPoint {
    // Squared Euclidean distance in degree space; only used to order candidates
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.location.lat() - point[0];
        let dy = self.location.lon() - point[1];
        dx * dx + dy * dy
    }
}

/// Axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl MapBounds {
    pub fn contains(&self, location: LatLon) -> bool {
        (self.south..=self.north).contains(&location.lat())
            && (self.west..=self.east).contains(&location.lon())
    }

    /// `[[south, west], [north, east]]`, the corner order map widgets expect.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

/// The base subset of one epoch, as indexed point geometries.
#[derive(Debug, Clone)]
pub struct GeoSubset {
    epoch: Epoch,
    rows: Arc<[usize]>,
    points: Vec<GeoPoint>,
    index: RTree<GeoPoint>,
}

impl GeoSubset {
    pub(crate) fn new(epoch: Epoch, rows: Arc<[usize]>, points: Vec<GeoPoint>) -> Self {
        let index = RTree::bulk_load(points.clone());
        Self {
            epoch,
            rows,
            points,
            index,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Store indices of the points, identical to the base filter's rows.
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub(crate) fn rows(&self) -> Arc<[usize]> {
        Arc::clone(&self.rows)
    }

    /// Points in store order.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of all points, widened by `padding_deg` on every side.
    /// `None` when the subset is empty.
    pub fn bounds(&self, padding_deg: f64) -> Option<MapBounds> {
        let first = self.points.first()?.location;
        let tight = self.points.iter().fold(
            MapBounds {
                south: first.lat(),
                west: first.lon(),
                north: first.lat(),
                east: first.lon(),
            },
            |bounds, point| MapBounds {
                south: bounds.south.min(point.location.lat()),
                west: bounds.west.min(point.location.lon()),
                north: bounds.north.max(point.location.lat()),
                east: bounds.east.max(point.location.lon()),
            },
        );
        Some(MapBounds {
            south: tight.south - padding_deg,
            west: tight.west - padding_deg,
            north: tight.north + padding_deg,
            east: tight.east + padding_deg,
        })
    }

    /// Points inside `bounds` (edges included), in store order.
    pub fn within(&self, bounds: &MapBounds) -> Vec<&GeoPoint> {
        // Inverted or NaN bounds contain nothing
        if !(bounds.south <= bounds.north && bounds.west <= bounds.east) {
            return vec![];
        }
        let envelope = AABB::from_corners([bounds.south, bounds.west], [bounds.north, bounds.east]);
        let mut points: Vec<&GeoPoint> = self.index.locate_in_envelope(&envelope).collect();
        points.sort_by_key(|point| point.row);
        points
    }

    /// Up to `limit` points closest to `location`, with great-circle distances
    /// in kilometres, closest first.
    pub fn nearest(&self, location: LatLon, limit: usize) -> Vec<(&GeoPoint, f64)> {
        if limit == 0 {
            return vec![];
        }

        // Degree-space ordering can differ from great-circle ordering, so
        // over-fetch candidates and re-rank them
        let candidate_limit = limit.saturating_mul(2).max(20);
        let query_point = [location.lat(), location.lon()];

        let mut candidates: Vec<(&GeoPoint, f64)> = self
            .index
            .nearest_neighbor_iter(&query_point)
            .take(candidate_limit)
            .map(|point| {
                let distance_km = great_circle_km(
                    location.lat(),
                    location.lon(),
                    point.location.lat(),
                    point.location.lon(),
                );
                (point, distance_km)
            })
            .collect();

        candidates.sort_by_key(|(point, distance_km)| (OrderedFloat(*distance_km), point.row));
        candidates.truncate(limit);
        candidates
    }

    /// GeoJSON `FeatureCollection` of `Point` features (`[lon, lat]`, EPSG:4326).
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .points
            .iter()
            .map(|point| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [point.location.lon(), point.location.lat()],
                    },
                    "properties": {
                        "row": point.row,
                        "station": point.station,
                        "date_label": point.date_label,
                        "temperature": point.temperature,
                        "wind_speed": point.wind_speed,
                        "marker_color": point.marker.as_str(),
                    },
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn observation(station: &str, lat: f64, lon: f64, wind_speed: f64) -> Observation {
        Observation {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            lat,
            lon,
            temperature: 75.0,
            wind_speed,
            date_label: "Mon-Jan-01".to_string(),
            station: station.to_string(),
        }
    }

    fn subset() -> GeoSubset {
        let observations = [
            observation("HNL", 21.30, -157.90, 12.0),
            observation("OGG", 20.90, -156.43, 4.0),
            observation("ITO", 19.72, -155.05, 10.0),
        ];
        let rows: Arc<[usize]> = Arc::from(vec![0, 3, 7]);
        let points = rows
            .iter()
            .zip(observations.iter())
            .map(|(row, obs)| GeoPoint::from_observation(*row, obs, 10.0))
            .collect();
        GeoSubset::new(Epoch::default(), rows, points)
    }

    // 6 x 6 grid of points, 0.2 degrees apart, south-west corner at (20.0, -158.0)
    fn grid_subset() -> GeoSubset {
        let points: Vec<GeoPoint> = (0..36)
            .map(|row| {
                let lat = 20.0 + (row / 6) as f64 * 0.2;
                let lon = -158.0 + (row % 6) as f64 * 0.2;
                let wind_speed = (row % 15) as f64;
                GeoPoint::from_observation(row, &observation("HNL", lat, lon, wind_speed), 10.0)
            })
            .collect();
        let rows: Arc<[usize]> = points.iter().map(|point| point.row).collect();
        GeoSubset::new(Epoch::default(), rows, points)
    }

    #[test]
    fn test_marker_color_matches_partition_boundary() {
        assert_eq!(MarkerColor::for_wind(10.0, 10.0), MarkerColor::Red);
        assert_eq!(MarkerColor::for_wind(9.99, 10.0), MarkerColor::Green);
        assert_eq!(MarkerColor::for_wind(25.0, 10.0), MarkerColor::Red);

        let markers: Vec<_> = subset().points().iter().map(|p| p.marker).collect();
        assert_eq!(
            markers,
            vec![MarkerColor::Red, MarkerColor::Green, MarkerColor::Red]
        );
    }

    #[test]
    fn test_bounds_are_padded() {
        let bounds = subset().bounds(1.0).unwrap();
        assert!((bounds.south - 18.72).abs() < 1e-9);
        assert!((bounds.north - 22.30).abs() < 1e-9);
        assert!((bounds.west - -158.90).abs() < 1e-9);
        assert!((bounds.east - -154.05).abs() < 1e-9);
        assert_eq!(bounds.corners()[0], [bounds.south, bounds.west]);
    }

    #[test]
    fn test_empty_subset() {
        let empty = GeoSubset::new(Epoch::default(), Arc::from(Vec::new()), Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.bounds(1.0), None);
        assert!(empty.nearest(LatLon(21.0, -157.0), 3).is_empty());
        assert_eq!(empty.to_geojson()["features"], json!([]));
    }

    #[test]
    fn test_within_bounds() {
        let subset = subset();
        let maui_and_oahu = MapBounds {
            south: 20.5,
            west: -158.5,
            north: 21.5,
            east: -156.0,
        };
        let rows: Vec<usize> = subset.within(&maui_and_oahu).iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![0, 3]);
    }

    #[test]
    fn test_nearest_points() {
        let subset = subset();
        let nearest = subset.nearest(LatLon(20.8986, -156.4305), 2);
        assert_eq!(nearest.len(), 2);
        assert_eq!(nearest[0].0.station, "OGG");
        assert!(nearest[0].1 < 1.0);
        assert!(nearest[0].1 <= nearest[1].1);
        assert!(subset.nearest(LatLon(0.0, 0.0), 0).is_empty());
    }

    #[test]
    fn test_within_matches_linear_scan() {
        let subset = grid_subset();
        let viewport = MapBounds {
            south: 20.0,
            west: -157.5,
            north: 21.0,
            east: -156.5,
        };
        let expected: Vec<usize> = subset
            .points()
            .iter()
            .filter(|point| viewport.contains(point.location))
            .map(|point| point.row)
            .collect();
        let rows: Vec<usize> = subset.within(&viewport).iter().map(|p| p.row).collect();
        assert!(!rows.is_empty());
        assert_eq!(rows, expected);

        let inverted = MapBounds {
            south: 21.0,
            west: -156.5,
            north: 20.0,
            east: -157.5,
        };
        assert!(subset.within(&inverted).is_empty());
    }

    #[test]
    fn test_nearest_with_unbounded_limit_returns_every_point() {
        let single = GeoSubset::new(
            Epoch::default(),
            Arc::from(vec![0]),
            vec![GeoPoint::from_observation(0, &observation("HNL", 21.30, -157.90, 12.0), 10.0)],
        );
        assert_eq!(single.nearest(LatLon(21.0, -157.0), usize::MAX).len(), 1);

        let subset = grid_subset();
        assert_eq!(subset.nearest(LatLon(21.0, -157.0), usize::MAX).len(), subset.len());
    }

    #[test]
    fn test_nearest_reranks_beyond_overfetch() {
        let subset = grid_subset();
        assert!(subset.len() > 20);
        let target = LatLon(20.55, -157.05);

        let mut expected: Vec<(usize, f64)> = subset
            .points()
            .iter()
            .map(|point| {
                let distance_km = great_circle_km(
                    target.lat(),
                    target.lon(),
                    point.location.lat(),
                    point.location.lon(),
                );
                (point.row, distance_km)
            })
            .collect();
        expected.sort_by_key(|(row, distance_km)| (OrderedFloat(*distance_km), *row));

        let nearest = subset.nearest(target, 5);
        assert_eq!(nearest.len(), 5);
        let rows: Vec<usize> = nearest.iter().map(|(point, _)| point.row).collect();
        let expected_rows: Vec<usize> = expected.iter().take(5).map(|(row, _)| *row).collect();
        assert_eq!(rows, expected_rows);
        assert!(nearest.windows(2).all(|pair| pair[0].1 <= pair[1].1));
    }

    #[test]
    fn test_geojson_uses_lon_lat_order() {
        let geojson = subset().to_geojson();
        assert_eq!(geojson["type"], "FeatureCollection");
        let first = &geojson["features"][0];
        assert_eq!(first["geometry"]["coordinates"], json!([-157.90, 21.30]));
        assert_eq!(first["properties"]["station"], "HNL");
        assert_eq!(first["properties"]["marker_color"], "red");
        assert_eq!(geojson["features"].as_array().unwrap().len(), 3);
    }
}
