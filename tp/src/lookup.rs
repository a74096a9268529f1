//! Soft failures from the geocoding and routing providers
//!
//! A `LookupError` never aborts a pipeline run. The geocoder turns it into an
//! empty suggestion list and the assembler turns it into an empty route plus
//! a warning.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed provider response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("provider response contained no features")]
    NoFeatures,

    #[error("route geometry is empty")]
    EmptyGeometry,

    #[error("{0}")]
    Other(String),
}

impl LookupError {
    /// Short label for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::Network(e) if e.is_timeout() => "timeout",
            LookupError::Network(_) => "network",
            LookupError::Status { .. } => "status",
            LookupError::Json(_) => "json",
            LookupError::NoFeatures => "no-features",
            LookupError::EmptyGeometry => "empty-geometry",
            LookupError::Other(_) => "other",
        }
    }
}
