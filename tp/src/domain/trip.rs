//! Trip entities: candidates, stops, route and the assembled result

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::geo::LatLon;

/// Reasons a point of interest is refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidPoint {
    #[error("place name is empty")]
    EmptyName,

    #[error("coordinate out of range: lat={lat}, lon={lon}")]
    OutOfRange { lat: f64, lon: f64 },
}

/// A city returned by the geocoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCandidate {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityCandidate {
    pub fn new(display_name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            display_name: display_name.into(),
            latitude,
            longitude,
        }
    }

    pub fn center(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }
}

/// A named place suggested for the itinerary
///
/// Only constructible through [`PointOfInterest::new`], which enforces a
/// non-empty name and in-range coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointOfInterest {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl PointOfInterest {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self, InvalidPoint> {
        let name = name.into().trim().to_string();
        debug!(%name, %latitude, %longitude, "PointOfInterest::new: called");
        if name.is_empty() {
            return Err(InvalidPoint::EmptyName);
        }
        if !LatLon::new(latitude, longitude).is_valid() {
            return Err(InvalidPoint::OutOfRange {
                lat: latitude,
                lon: longitude,
            });
        }
        Ok(Self {
            name,
            latitude,
            longitude,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn position(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }
}

/// Ordered `(lat, lon)` path; empty means "no route"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteGeometry(Vec<LatLon>);

impl RouteGeometry {
    pub fn new(points: Vec<LatLon>) -> Self {
        Self(points)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[LatLon] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Distance and walking time reported by the router
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_hours: f64,
}

/// The single artifact a pipeline run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripResult {
    pub city_name: String,
    pub city_center: LatLon,
    pub stops: Vec<PointOfInterest>,
    pub route: RouteGeometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_summary: Option<RouteSummary>,
}

impl TripResult {
    /// Waypoints in visiting order: city center first, then each stop
    pub fn waypoints(&self) -> Vec<LatLon> {
        waypoints_for(self.city_center, &self.stops)
    }

    pub fn has_route(&self) -> bool {
        !self.route.is_empty()
    }
}

/// Build the routing waypoint list without reordering stops
pub fn waypoints_for(center: LatLon, stops: &[PointOfInterest]) -> Vec<LatLon> {
    std::iter::once(center).chain(stops.iter().map(PointOfInterest::position)).collect()
}
