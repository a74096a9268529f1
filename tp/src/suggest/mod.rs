//! Place suggestions from a generative text model
//!
//! One structured-output request per run. Anything that goes wrong here is a
//! [`GenerationError`] and ends the run before routing starts.

use std::sync::Arc;

use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};

mod parse;

pub use parse::{ParsedPlaces, Rejection, parse_places, strip_code_fence};

use crate::domain::{CityCandidate, PointOfInterest};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};
use crate::prompts::{PlacesPromptContext, PromptLoader};

/// Token ceiling for a place suggestion reply
const SUGGESTION_MAX_TOKENS: u32 = 1024;

/// Most places a single run may ask for or keep
pub const MAX_STOPS: usize = 3;

/// Hard failures of the suggestion step
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("the place suggestion service failed: {0}")]
    Provider(#[from] LlmError),

    #[error("the place suggestion service returned an empty reply")]
    EmptyReply,

    #[error("the place suggestions could not be read: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("the place suggestions were not a list")]
    NotAList,

    #[error("none of the suggested places were usable ({rejected} rejected)")]
    NoValidPlaces { rejected: usize },

    #[error("failed to build the suggestion prompt: {0}")]
    Prompt(String),
}

/// JSON Schema for the reply: an array of `{name, lat, lon}`
pub fn places_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "lat": { "type": "number" },
                "lon": { "type": "number" }
            },
            "required": ["name", "lat", "lon"],
            "additionalProperties": false
        }
    })
}

/// Asks the model for points of interest around a city
pub struct PlaceSuggester {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    stops: usize,
    max_distance_km: Option<f64>,
}

impl PlaceSuggester {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader, stops: usize, max_distance_km: Option<f64>) -> Self {
        debug!(%stops, ?max_distance_km, "PlaceSuggester::new: called");
        Self {
            llm,
            prompts,
            stops: stops.clamp(1, MAX_STOPS),
            max_distance_km,
        }
    }

    /// Number of places requested per run
    pub fn stops(&self) -> usize {
        self.stops
    }

    /// Request places for `city`; returns 1..=stops valid places
    pub async fn suggest(
        &self,
        city: &CityCandidate,
        duration_days: u8,
        interests: &str,
    ) -> Result<Vec<PointOfInterest>, GenerationError> {
        debug!(city = %city.display_name, %duration_days, %interests, "PlaceSuggester::suggest: called");

        let context = PlacesPromptContext::new(city, duration_days, interests, self.stops);
        let prompt = self
            .prompts
            .places_prompt(&context)
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;
        let system_prompt = self
            .prompts
            .system_prompt()
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;

        let request = CompletionRequest {
            system_prompt,
            messages: vec![Message::user(prompt)],
            max_tokens: SUGGESTION_MAX_TOKENS,
            response_schema: Some(places_schema()),
        };

        let response = self.llm.complete(request).await?;
        debug!(stop_reason = ?response.stop_reason, tokens = response.usage.total(), "PlaceSuggester::suggest: reply received");
        let text = response.content.ok_or(GenerationError::EmptyReply)?;

        let parsed = parse_places(&text, city.center(), self.max_distance_km, self.stops)?;
        if parsed.places.is_empty() {
            return Err(GenerationError::NoValidPlaces {
                rejected: parsed.rejected.len(),
            });
        }

        info!(
            city = %city.display_name,
            places = parsed.places.len(),
            rejected = parsed.rejected.len(),
            "Place suggestions accepted"
        );
        Ok(parsed.places)
    }
}
