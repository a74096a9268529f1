//! Decoding of the model's structured reply
//!
//! The reply is treated as inert JSON. A reply that is not a JSON array fails
//! outright; individual entries that don't describe a usable place are
//! dropped and reported back to the caller.

use serde_json::Value;
use tracing::{debug, warn};

use super::GenerationError;
use crate::domain::{InvalidPoint, LatLon, PointOfInterest};

/// Why a single entry of the reply was dropped
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    NotAnObject,
    MissingField(&'static str),
    WrongType(&'static str),
    Invalid(InvalidPoint),
    TooFar { distance_km: f64 },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NotAnObject => write!(f, "entry is not an object"),
            Rejection::MissingField(field) => write!(f, "missing field '{field}'"),
            Rejection::WrongType(field) => write!(f, "field '{field}' has the wrong type"),
            Rejection::Invalid(e) => write!(f, "{e}"),
            Rejection::TooFar { distance_km } => write!(f, "{distance_km:.1} km from the city center"),
        }
    }
}

/// Result of decoding one reply
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPlaces {
    pub places: Vec<PointOfInterest>,
    pub rejected: Vec<(usize, Rejection)>,
}

/// Strip a surrounding markdown code fence, if any
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "python", ...) on the opening line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Decode a reply into points of interest
///
/// `center` and `max_distance_km` apply the vicinity check; entries beyond
/// `limit` are ignored after validation order is settled.
pub fn parse_places(
    text: &str,
    center: LatLon,
    max_distance_km: Option<f64>,
    limit: usize,
) -> Result<ParsedPlaces, GenerationError> {
    debug!(len = text.len(), ?max_distance_km, %limit, "parse_places: called");
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(GenerationError::EmptyReply);
    }

    let value: Value = serde_json::from_str(body).map_err(GenerationError::Malformed)?;
    let Value::Array(items) = value else {
        return Err(GenerationError::NotAList);
    };

    let mut places = Vec::new();
    let mut rejected = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        match decode_item(item, center, max_distance_km) {
            Ok(place) => places.push(place),
            Err(reason) => {
                warn!(%idx, %reason, "Dropping suggested place");
                rejected.push((idx, reason));
            }
        }
    }

    if places.len() > limit {
        debug!(kept = limit, dropped = places.len() - limit, "parse_places: truncating to stop count");
        places.truncate(limit);
    }

    Ok(ParsedPlaces { places, rejected })
}

fn decode_item(item: &Value, center: LatLon, max_distance_km: Option<f64>) -> Result<PointOfInterest, Rejection> {
    let obj = item.as_object().ok_or(Rejection::NotAnObject)?;

    let name = obj
        .get("name")
        .ok_or(Rejection::MissingField("name"))?
        .as_str()
        .ok_or(Rejection::WrongType("name"))?;
    let lat = number_field(obj, "lat")?;
    let lon = number_field(obj, "lon")?;

    let place = PointOfInterest::new(name, lat, lon).map_err(Rejection::Invalid)?;

    if let Some(limit) = max_distance_km {
        let distance_km = center.distance_km(&place.position());
        if distance_km > limit {
            return Err(Rejection::TooFar { distance_km });
        }
    }
    Ok(place)
}

fn number_field(obj: &serde_json::Map<String, Value>, field: &'static str) -> Result<f64, Rejection> {
    obj.get(field)
        .ok_or(Rejection::MissingField(field))?
        .as_f64()
        .ok_or(Rejection::WrongType(field))
}
