//! Route lookup between ordered waypoints

use async_trait::async_trait;

use crate::domain::{LatLon, RouteGeometry, RouteSummary};
use crate::lookup::LookupError;

/// A routed path, already converted to `(lat, lon)` order
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    pub geometry: RouteGeometry,
    pub summary: Option<RouteSummary>,
}

/// Turns ordered waypoints into a path visiting them in that order
///
/// Implementations must not reorder the waypoints, and must return an error
/// rather than an empty geometry.
#[async_trait]
pub trait Router: Send + Sync {
    async fn route(&self, waypoints: &[LatLon], mode: &str) -> Result<RoutedPath, LookupError>;
}
