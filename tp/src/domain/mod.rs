//! Typed entities shared by every pipeline stage

pub mod geo;
mod trip;

pub use geo::{LatLon, lon_lat_to_lat_lon};
pub use trip::{
    CityCandidate, InvalidPoint, PointOfInterest, RouteGeometry, RouteSummary, TripResult, waypoints_for,
};
