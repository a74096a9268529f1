//! Geoapify GeoJSON response shapes

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::geo::convert_line;
use crate::domain::{CityCandidate, LatLon, RouteSummary};
use crate::lookup::LookupError;

/// Autocomplete reply; features are decoded one at a time
#[derive(Debug, Deserialize)]
pub(crate) struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    properties: PlaceProperties,
}

#[derive(Debug, Deserialize)]
struct PlaceProperties {
    formatted: String,
    lat: f64,
    lon: f64,
}

/// Decode autocomplete features, skipping the ones that don't fit
pub(crate) fn candidates_from(collection: FeatureCollection) -> Vec<CityCandidate> {
    debug!(features = collection.features.len(), "candidates_from: called");
    collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(idx, feature)| match serde_json::from_value::<PlaceFeature>(feature) {
            Ok(place) if LatLon::new(place.properties.lat, place.properties.lon).is_valid() => Some(
                CityCandidate::new(place.properties.formatted, place.properties.lat, place.properties.lon),
            ),
            Ok(place) => {
                warn!(%idx, name = %place.properties.formatted, "Skipping city with out-of-range coordinates");
                None
            }
            Err(e) => {
                warn!(%idx, error = %e, "Skipping malformed city feature");
                None
            }
        })
        .collect()
}

/// Routing reply
#[derive(Debug, Deserialize)]
pub(crate) struct RouteCollection {
    #[serde(default)]
    pub features: Vec<RouteFeature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RouteFeature {
    #[serde(default)]
    pub properties: RouteProperties,
    pub geometry: Geometry,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RouteProperties {
    /// Metres
    pub distance: Option<f64>,
    /// Seconds
    pub time: Option<f64>,
}

impl RouteProperties {
    pub fn summary(&self) -> Option<RouteSummary> {
        match (self.distance, self.time) {
            (Some(distance), Some(time)) => Some(RouteSummary {
                distance_km: distance / 1000.0,
                duration_hours: time / 3600.0,
            }),
            _ => None,
        }
    }
}

/// Route geometry in provider `[lon, lat]` order
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub(crate) enum Geometry {
    LineString(Vec<[f64; 2]>),
    MultiLineString(Vec<Vec<[f64; 2]>>),
}

impl Geometry {
    /// Flatten into one `(lat, lon)` path
    ///
    /// Legs are joined in order; a leg starting where the previous one ended
    /// does not repeat the joint point.
    pub fn into_path(self) -> Result<Vec<LatLon>, LookupError> {
        let legs = match self {
            Geometry::LineString(line) => vec![line],
            Geometry::MultiLineString(legs) => legs,
        };
        debug!(legs = legs.len(), "Geometry::into_path: called");

        let mut path: Vec<LatLon> = Vec::new();
        for leg in legs {
            let points = convert_line(&leg);
            let skip = usize::from(path.last().is_some() && path.last() == points.first());
            path.extend(points.into_iter().skip(skip));
        }

        if path.is_empty() {
            return Err(LookupError::EmptyGeometry);
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidates_skip_malformed() {
        let collection: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                { "properties": { "formatted": "Paris, France", "lat": 48.8566, "lon": 2.3522 } },
                { "properties": { "formatted": "No coords" } },
                { "properties": { "formatted": "Bad", "lat": 123.0, "lon": 2.0 } },
                { "properties": { "formatted": "Paris, TX, United States", "lat": 33.66, "lon": -95.55 } }
            ]
        }))
        .unwrap();

        let candidates = candidates_from(collection);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].display_name, "Paris, France");
        assert_eq!(candidates[1].longitude, -95.55);
    }

    #[test]
    fn test_line_string_swaps_order() {
        let geometry: Geometry = serde_json::from_value(json!({
            "type": "LineString",
            "coordinates": [[2.2945, 48.8584], [2.30, 48.86]]
        }))
        .unwrap();

        let path = geometry.into_path().unwrap();
        assert_eq!(path, vec![LatLon::new(48.8584, 2.2945), LatLon::new(48.86, 2.30)]);
    }

    #[test]
    fn test_multi_line_string_joins_legs() {
        let geometry: Geometry = serde_json::from_value(json!({
            "type": "MultiLineString",
            "coordinates": [
                [[2.35, 48.85], [2.34, 48.86]],
                [[2.34, 48.86], [2.33, 48.87]],
                [[2.32, 48.88], [2.31, 48.89]]
            ]
        }))
        .unwrap();

        let path = geometry.into_path().unwrap();
        assert_eq!(
            path,
            vec![
                LatLon::new(48.85, 2.35),
                LatLon::new(48.86, 2.34),
                LatLon::new(48.87, 2.33),
                LatLon::new(48.88, 2.32),
                LatLon::new(48.89, 2.31),
            ]
        );
    }

    #[test]
    fn test_empty_geometry_is_error() {
        let geometry = Geometry::MultiLineString(vec![vec![], vec![]]);
        assert!(matches!(geometry.into_path(), Err(LookupError::EmptyGeometry)));
    }

    #[test]
    fn test_summary_units() {
        let props = RouteProperties {
            distance: Some(4500.0),
            time: Some(5400.0),
        };
        let summary = props.summary().unwrap();
        assert_eq!(summary.distance_km, 4.5);
        assert_eq!(summary.duration_hours, 1.5);
        assert!(RouteProperties::default().summary().is_none());
    }
}
