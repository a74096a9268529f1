//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Place suggestion request
pub const PLACES: &str = include_str!("../../prompts/places.pmt");

/// System instruction for place suggestions
pub const SYSTEM: &str = include_str!("../../prompts/system.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "places" => {
            debug!("get_embedded: matched places");
            Some(PLACES)
        }
        "system" => {
            debug!("get_embedded: matched system");
            Some(SYSTEM)
        }
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_places() {
        let places = get_embedded("places").unwrap();
        assert!(places.contains("{{city_name}}"));
        assert!(places.contains("{{stop_count}}"));
        assert!(places.contains("\"lat\""));
        assert!(places.contains("\"lon\""));
    }

    #[test]
    fn test_get_embedded_system() {
        assert!(get_embedded("system").unwrap().contains("JSON"));
    }

    #[test]
    fn test_get_embedded_unknown() {
        assert!(get_embedded("unknown-template").is_none());
    }
}
