//! tripplanner - AI-assisted walking itineraries
//!
//! Pick a city, a trip length and some interests; a generative text model
//! suggests a handful of places, a routing service draws a walking line
//! through them, and the result is held as one immutable trip.
//!
//! # Core Concepts
//!
//! - **Typed pipeline**: city candidate, points of interest, route geometry
//!   and the assembled trip are explicit types, never loose maps
//! - **Inert model output**: replies are decoded as JSON and validated, never
//!   evaluated
//! - **Soft lookups**: geocoding and routing failures degrade the result,
//!   only suggestion failures abort a run
//! - **Whole-value state**: a session holds the latest trip and swaps it as a
//!   unit
//!
//! # Modules
//!
//! - [`domain`] - Coordinates, candidates, stops, routes and trips
//! - [`llm`] - LLM client trait with Gemini and OpenAI implementations
//! - [`prompts`] - Handlebars prompt templates
//! - [`geoapify`] - Geocoding and routing client
//! - [`geocode`] / [`routing`] - Provider seams and lookup policy
//! - [`suggest`] - Place suggestions and reply validation
//! - [`itinerary`] - Pipeline assembly
//! - [`session`] - Per-session trip holder
//! - [`render`] - Itinerary text, map links and GeoJSON
//! - [`config`] - Configuration types and loading
//! - [`cli`] / [`repl`] - Command-line and interactive front ends

pub mod cli;
pub mod config;
pub mod domain;
pub mod geoapify;
pub mod geocode;
pub mod itinerary;
pub mod llm;
pub mod lookup;
pub mod prompts;
pub mod render;
pub mod repl;
pub mod routing;
pub mod session;
pub mod suggest;

// Re-export commonly used types
pub use config::{Config, ConfigError, GeoapifyConfig, LlmConfig, PlannerConfig};
pub use domain::{CityCandidate, LatLon, PointOfInterest, RouteGeometry, RouteSummary, TripResult};
pub use geoapify::GeoapifyClient;
pub use geocode::{CitySuggestions, Geocoder, suggest_cities};
pub use itinerary::{Assembler, Assembly, PipelineState, TripForm, TripRequest};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, create_client};
pub use lookup::LookupError;
pub use routing::{RoutedPath, Router};
pub use session::{GenerateOutcome, Notice, Session, TripState};
pub use suggest::{GenerationError, PlaceSuggester};
