//! Coordinate types and conversions
//!
//! Everything inside the crate is `(latitude, longitude)`. Geoapify routing
//! geometry and GeoJSON both use `(longitude, latitude)`, so the two
//! conversions below are the only places where the order flips.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mean Earth radius used for great-circle distances
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A `(latitude, longitude)` pair in decimal degrees
///
/// Serializes as a two-element array `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite and inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Flip into the `(longitude, latitude)` order used by GeoJSON
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Great-circle distance in kilometres (haversine)
    pub fn distance_km(&self, other: &LatLon) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

impl From<[f64; 2]> for LatLon {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<LatLon> for [f64; 2] {
    fn from(point: LatLon) -> Self {
        [point.lat, point.lon]
    }
}

impl std::fmt::Display for LatLon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Convert a provider `[lon, lat]` pair into a [`LatLon`]
pub fn lon_lat_to_lat_lon(pair: [f64; 2]) -> LatLon {
    LatLon::new(pair[1], pair[0])
}

/// Convert a provider line of `[lon, lat]` pairs, preserving order
pub fn convert_line(line: &[[f64; 2]]) -> Vec<LatLon> {
    debug!(points = line.len(), "convert_line: called");
    line.iter().copied().map(lon_lat_to_lat_lon).collect()
}
