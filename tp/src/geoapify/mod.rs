//! Geoapify client: city autocomplete and routing
//!
//! One HTTP client serves both the [`Geocoder`] and [`Router`] seams. Every
//! failure comes back as a [`LookupError`]; callers decide how soft it is.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

mod types;

use self::types::{FeatureCollection, RouteCollection, candidates_from};
use crate::config::{ConfigError, GeoapifyConfig};
use crate::domain::{CityCandidate, LatLon, RouteGeometry};
use crate::geocode::Geocoder;
use crate::lookup::LookupError;
use crate::routing::{RoutedPath, Router};

/// Geoapify API client
pub struct GeoapifyClient {
    api_key: String,
    base_url: String,
    http: Client,
    autocomplete_limit: u32,
}

impl GeoapifyClient {
    /// Create a new client, reading the API key from the configured env var
    pub fn from_config(config: &GeoapifyConfig) -> Result<Self, ConfigError> {
        debug!(base_url = %config.base_url, "GeoapifyClient::from_config: called");
        let api_key = config.api_key()?;
        Ok(Self::with_key(config, api_key))
    }

    /// Create a new client with an explicit API key
    pub fn with_key(config: &GeoapifyConfig, api_key: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build HTTP client with timeout, using defaults");
                Client::new()
            });

        Self {
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            autocomplete_limit: config.autocomplete_limit,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, LookupError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "get_json: called");

        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "get_json: non-success status");
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Pipe-delimited `lat,lon|lat,lon` waypoint parameter
fn waypoints_param(waypoints: &[LatLon]) -> String {
    waypoints.iter().map(LatLon::to_string).collect::<Vec<_>>().join("|")
}

#[async_trait]
impl Geocoder for GeoapifyClient {
    async fn search(&self, text: &str) -> Result<Vec<CityCandidate>, LookupError> {
        debug!(%text, "GeoapifyClient::search: called");
        let collection: FeatureCollection = self
            .get_json(
                "/v1/geocode/autocomplete",
                &[
                    ("text", text.to_string()),
                    ("type", "city".to_string()),
                    ("limit", self.autocomplete_limit.to_string()),
                ],
            )
            .await?;
        Ok(candidates_from(collection))
    }
}

#[async_trait]
impl Router for GeoapifyClient {
    async fn route(&self, waypoints: &[LatLon], mode: &str) -> Result<RoutedPath, LookupError> {
        debug!(waypoints = waypoints.len(), %mode, "GeoapifyClient::route: called");
        if waypoints.len() < 2 {
            return Err(LookupError::Other(format!(
                "need at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }

        let collection: RouteCollection = self
            .get_json(
                "/v1/routing",
                &[("waypoints", waypoints_param(waypoints)), ("mode", mode.to_string())],
            )
            .await?;

        let feature = collection.features.into_iter().next().ok_or(LookupError::NoFeatures)?;
        let summary = feature.properties.summary();
        let path = feature.geometry.into_path()?;
        info!(points = path.len(), "Route received");

        Ok(RoutedPath {
            geometry: RouteGeometry::new(path),
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> GeoapifyClient {
        let config = GeoapifyConfig {
            base_url: server.base_url(),
            ..GeoapifyConfig::default()
        };
        GeoapifyClient::with_key(&config, "geo-key")
    }

    #[test]
    fn test_waypoints_param() {
        let param = waypoints_param(&[LatLon::new(48.8566, 2.3522), LatLon::new(48.8606, 2.3376)]);
        assert_eq!(param, "48.8566,2.3522|48.8606,2.3376");
    }

    #[tokio::test]
    async fn test_search_sends_city_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/geocode/autocomplete")
                    .query_param("text", "Paris")
                    .query_param("type", "city")
                    .query_param("limit", "5")
                    .query_param("apiKey", "geo-key");
                then.status(200).json_body(json!({
                    "type": "FeatureCollection",
                    "features": [
                        { "type": "Feature", "properties": { "formatted": "Paris, France", "lat": 48.8566, "lon": 2.3522 } }
                    ]
                }));
            })
            .await;

        let candidates = client(&server).search("Paris").await.unwrap();
        mock.assert_async().await;
        assert_eq!(candidates, vec![CityCandidate::new("Paris, France", 48.8566, 2.3522)]);
    }

    #[tokio::test]
    async fn test_search_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/geocode/autocomplete");
                then.status(401).body("unauthorized");
            })
            .await;

        let err = client(&server).search("Paris").await.unwrap_err();
        assert!(matches!(err, LookupError::Status { status: 401 }));
    }

    #[tokio::test]
    async fn test_route_converts_geometry() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/routing")
                    .query_param("waypoints", "48.8566,2.3522|48.8584,2.2945")
                    .query_param("mode", "walk")
                    .query_param("apiKey", "geo-key");
                then.status(200).json_body(json!({
                    "type": "FeatureCollection",
                    "features": [{
                        "type": "Feature",
                        "properties": { "distance": 5200, "time": 3900, "mode": "walk" },
                        "geometry": {
                            "type": "MultiLineString",
                            "coordinates": [[[2.3522, 48.8566], [2.2945, 48.8584]]]
                        }
                    }]
                }));
            })
            .await;

        let path = client(&server)
            .route(&[LatLon::new(48.8566, 2.3522), LatLon::new(48.8584, 2.2945)], "walk")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            path.geometry.points(),
            &[LatLon::new(48.8566, 2.3522), LatLon::new(48.8584, 2.2945)]
        );
        let summary = path.summary.unwrap();
        assert_eq!(summary.distance_km, 5.2);
    }

    #[tokio::test]
    async fn test_route_without_features() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/routing");
                then.status(200).json_body(json!({ "type": "FeatureCollection", "features": [] }));
            })
            .await;

        let err = client(&server)
            .route(&[LatLon::new(48.8566, 2.3522), LatLon::new(48.8584, 2.2945)], "walk")
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::NoFeatures));
    }

    #[tokio::test]
    async fn test_route_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/routing");
                then.status(200).body("<html>gateway</html>");
            })
            .await;

        let err = client(&server)
            .route(&[LatLon::new(48.8566, 2.3522), LatLon::new(48.8584, 2.2945)], "walk")
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Json(_)));
    }

    #[tokio::test]
    async fn test_route_needs_two_waypoints() {
        let server = MockServer::start_async().await;
        let err = client(&server)
            .route(&[LatLon::new(48.8566, 2.3522)], "walk")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "other");
    }
}
