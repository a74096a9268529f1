//! Itinerary assembly
//!
//! Turns a complete [`TripRequest`] into a [`TripResult`]: suggest places,
//! route through them, package the result. Suggestion failures end the run.
//! Routing failures only cost the polyline and come back as a warning.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::{CityCandidate, RouteGeometry, TripResult, waypoints_for};
use crate::llm::{LlmError, create_client};
use crate::prompts::PromptLoader;
use crate::routing::Router;
use crate::suggest::{GenerationError, PlaceSuggester};

/// Shortest trip accepted
pub const MIN_DAYS: u8 = 1;

/// Longest trip accepted
pub const MAX_DAYS: u8 = 7;

/// Warning shown when the route could not be fetched
pub const ROUTE_UNAVAILABLE: &str = "Could not draw the route line; showing markers only.";

/// What the form layer has collected so far
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripForm {
    pub selected_city: Option<CityCandidate>,
    pub duration_days: Option<u8>,
    pub interests: Option<String>,
}

impl TripForm {
    /// The complete request, or `None` while any field is still missing
    ///
    /// Blank interests count as missing.
    pub fn request(&self) -> Option<Result<TripRequest, InvalidRequest>> {
        debug!(?self, "TripForm::request: called");
        let interests = self.interests.as_ref().filter(|text| !text.trim().is_empty());
        match (&self.selected_city, self.duration_days, interests) {
            (Some(city), Some(days), Some(interests)) => {
                Some(TripRequest::new(city.clone(), days, interests.clone()))
            }
            _ => None,
        }
    }
}

/// Form input that is present but unusable
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidRequest {
    #[error("trip duration must be between 1 and 7 days, got {0}")]
    Duration(u8),

    #[error("interests must not be empty")]
    EmptyInterests,
}

/// A validated pipeline input
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    city: CityCandidate,
    duration_days: u8,
    interests: String,
}

impl TripRequest {
    pub fn new(city: CityCandidate, duration_days: u8, interests: impl Into<String>) -> Result<Self, InvalidRequest> {
        let interests = interests.into().trim().to_string();
        if !(MIN_DAYS..=MAX_DAYS).contains(&duration_days) {
            return Err(InvalidRequest::Duration(duration_days));
        }
        if interests.is_empty() {
            return Err(InvalidRequest::EmptyInterests);
        }
        Ok(Self {
            city,
            duration_days,
            interests,
        })
    }

    pub fn city(&self) -> &CityCandidate {
        &self.city
    }

    pub fn duration_days(&self) -> u8 {
        self.duration_days
    }

    pub fn interests(&self) -> &str {
        &self.interests
    }
}

/// Where a run is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Generating,
    Routing,
    Ready,
    Failed,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PipelineState::Idle => "idle",
            PipelineState::Generating => "generating",
            PipelineState::Routing => "routing",
            PipelineState::Ready => "ready",
            PipelineState::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// A finished run
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub trip: TripResult,
    /// Set when the route could not be fetched
    pub warning: Option<String>,
}

/// Sequences suggestion and routing for one request
pub struct Assembler {
    suggester: PlaceSuggester,
    router: Arc<dyn Router>,
    travel_mode: String,
}

impl Assembler {
    pub fn new(suggester: PlaceSuggester, router: Arc<dyn Router>, travel_mode: impl Into<String>) -> Self {
        let travel_mode = travel_mode.into();
        debug!(%travel_mode, "Assembler::new: called");
        Self {
            suggester,
            router,
            travel_mode,
        }
    }

    /// Wire the configured LLM provider and prompt overrides from `prompt_root`
    pub fn from_config(config: &Config, router: Arc<dyn Router>, prompt_root: &Path) -> Result<Self, LlmError> {
        debug!(provider = %config.llm.provider, ?prompt_root, "Assembler::from_config: called");
        let llm = create_client(&config.llm)?;
        let suggester = PlaceSuggester::new(
            llm,
            PromptLoader::new(prompt_root),
            config.planner.stops,
            config.planner.max_distance_km,
        );
        Ok(Self::new(suggester, router, config.planner.travel_mode.clone()))
    }

    /// Run the pipeline once
    ///
    /// `on_state` sees every transition: `Generating`, then either `Failed`
    /// or `Routing` followed by `Ready`.
    pub async fn assemble(
        &self,
        request: &TripRequest,
        mut on_state: impl FnMut(PipelineState),
    ) -> Result<Assembly, GenerationError> {
        let city = request.city();
        debug!(city = %city.display_name, days = request.duration_days(), "Assembler::assemble: called");

        on_state(PipelineState::Generating);
        let stops = match self
            .suggester
            .suggest(city, request.duration_days(), request.interests())
            .await
        {
            Ok(stops) => stops,
            Err(e) => {
                on_state(PipelineState::Failed);
                return Err(e);
            }
        };

        on_state(PipelineState::Routing);
        let center = city.center();
        let waypoints = waypoints_for(center, &stops);
        let (route, route_summary, warning) = match self.router.route(&waypoints, &self.travel_mode).await {
            Ok(path) => {
                debug!(points = path.geometry.len(), "Assembler::assemble: route ok");
                (path.geometry, path.summary, None)
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Routing failed, continuing without a route");
                (RouteGeometry::empty(), None, Some(ROUTE_UNAVAILABLE.to_string()))
            }
        };

        let trip = TripResult {
            city_name: city.display_name.clone(),
            city_center: center,
            stops,
            route,
            route_summary,
        };
        on_state(PipelineState::Ready);
        info!(
            city = %trip.city_name,
            stops = trip.stops.len(),
            route_points = trip.route.len(),
            "Trip assembled"
        );

        Ok(Assembly { trip, warning })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LatLon;
    use crate::llm::client::mock::MockLlmClient;
    use crate::lookup::LookupError;
    use crate::routing::RoutedPath;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const THREE_PLACES: &str = r#"[
        {"name": "Louvre Museum", "lat": 48.8606, "lon": 2.3376},
        {"name": "Musée d'Orsay", "lat": 48.8600, "lon": 2.3266},
        {"name": "Centre Pompidou", "lat": 48.8607, "lon": 2.3522}
    ]"#;

    struct FakeRouter {
        fail: bool,
        seen: Mutex<Vec<Vec<LatLon>>>,
    }

    impl FakeRouter {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Router for FakeRouter {
        async fn route(&self, waypoints: &[LatLon], mode: &str) -> Result<RoutedPath, LookupError> {
            assert_eq!(mode, "walk");
            self.seen.lock().unwrap().push(waypoints.to_vec());
            if self.fail {
                return Err(LookupError::Other("boom".to_string()));
            }
            Ok(RoutedPath {
                geometry: RouteGeometry::new(waypoints.to_vec()),
                summary: None,
            })
        }
    }

    fn paris() -> CityCandidate {
        CityCandidate::new("Paris, France", 48.8566, 2.3522)
    }

    fn assembler(reply: &str, router: Arc<FakeRouter>) -> Assembler {
        let llm = Arc::new(MockLlmClient::replying(reply));
        let suggester = PlaceSuggester::new(llm, PromptLoader::embedded_only(), 3, Some(50.0));
        Assembler::new(suggester, router, "walk")
    }

    #[test]
    fn test_form_incomplete_is_none() {
        let form = TripForm {
            selected_city: Some(paris()),
            duration_days: Some(3),
            interests: None,
        };
        assert!(form.request().is_none());
        assert!(TripForm::default().request().is_none());
    }

    #[test]
    fn test_form_blank_interests_is_none() {
        let form = TripForm {
            selected_city: Some(paris()),
            duration_days: Some(3),
            interests: Some("  \t ".to_string()),
        };
        assert!(form.request().is_none());
    }

    #[test]
    fn test_request_validation() {
        assert!(TripRequest::new(paris(), 3, "art").is_ok());
        assert_eq!(TripRequest::new(paris(), 0, "art"), Err(InvalidRequest::Duration(0)));
        assert_eq!(TripRequest::new(paris(), 8, "art"), Err(InvalidRequest::Duration(8)));
        assert_eq!(TripRequest::new(paris(), 3, "   "), Err(InvalidRequest::EmptyInterests));
        assert_eq!(TripRequest::new(paris(), 7, " food ").unwrap().interests(), "food");
    }

    #[tokio::test]
    async fn test_assemble_routes_center_then_stops() {
        let router = FakeRouter::new(false);
        let assembler = assembler(THREE_PLACES, router.clone());
        let request = TripRequest::new(paris(), 3, "art").unwrap();

        let mut states = Vec::new();
        let assembly = assembler.assemble(&request, |s| states.push(s)).await.unwrap();

        assert_eq!(states, vec![PipelineState::Generating, PipelineState::Routing, PipelineState::Ready]);
        assert!(assembly.warning.is_none());
        assert_eq!(assembly.trip.stops.len(), 3);

        let seen = router.seen.lock().unwrap();
        assert_eq!(seen[0][0], LatLon::new(48.8566, 2.3522));
        assert_eq!(seen[0][1], LatLon::new(48.8606, 2.3376));
        assert_eq!(seen[0].len(), 4);
    }

    #[tokio::test]
    async fn test_route_failure_is_warning() {
        let assembler = assembler(THREE_PLACES, FakeRouter::new(true));
        let request = TripRequest::new(paris(), 3, "art").unwrap();

        let assembly = assembler.assemble(&request, |_| {}).await.unwrap();
        assert_eq!(assembly.trip.stops.len(), 3);
        assert!(assembly.trip.route.is_empty());
        assert!(assembly.trip.route_summary.is_none());
        assert_eq!(assembly.warning.as_deref(), Some(ROUTE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_generation_failure_skips_routing() {
        let router = FakeRouter::new(false);
        let assembler = assembler("not json", router.clone());
        let request = TripRequest::new(paris(), 3, "art").unwrap();

        let mut states = Vec::new();
        let result = assembler.assemble(&request, |s| states.push(s)).await;

        assert!(result.is_err());
        assert_eq!(states, vec![PipelineState::Generating, PipelineState::Failed]);
        assert!(router.seen.lock().unwrap().is_empty());
    }
}
