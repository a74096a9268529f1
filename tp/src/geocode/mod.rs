//! City lookup
//!
//! The [`Geocoder`] trait is the provider seam; [`suggest_cities`] applies the
//! interactive search policy on top of it: short inputs never reach the
//! network and any provider failure degrades to an empty list.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::CityCandidate;
use crate::lookup::LookupError;

/// Inputs shorter than this (in characters, after trimming) are not looked up
pub const MIN_QUERY_CHARS: usize = 3;

/// Turns a partial city name into ranked candidates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, text: &str) -> Result<Vec<CityCandidate>, LookupError>;
}

/// Candidates in provider relevance order
///
/// Iterating borrows, so the same suggestions can be walked any number of
/// times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitySuggestions(Vec<CityCandidate>);

impl CitySuggestions {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CityCandidate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 1-based pick, matching the numbering shown to the user
    pub fn pick(&self, number: usize) -> Option<&CityCandidate> {
        number.checked_sub(1).and_then(|idx| self.0.get(idx))
    }
}

impl From<Vec<CityCandidate>> for CitySuggestions {
    fn from(candidates: Vec<CityCandidate>) -> Self {
        Self(candidates)
    }
}

impl<'a> IntoIterator for &'a CitySuggestions {
    type Item = &'a CityCandidate;
    type IntoIter = std::slice::Iter<'a, CityCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for CitySuggestions {
    type Item = CityCandidate;
    type IntoIter = std::vec::IntoIter<CityCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Look up city candidates for an interactive search box
pub async fn suggest_cities(geocoder: &dyn Geocoder, text: &str) -> CitySuggestions {
    let query = text.trim();
    debug!(%query, "suggest_cities: called");

    if query.chars().count() < MIN_QUERY_CHARS {
        debug!("suggest_cities: query too short, skipping lookup");
        return CitySuggestions::empty();
    }

    match geocoder.search(query).await {
        Ok(candidates) => {
            debug!(count = candidates.len(), "suggest_cities: candidates found");
            CitySuggestions::from(candidates)
        }
        Err(e) => {
            warn!(kind = e.kind(), error = %e, %query, "City lookup failed, returning no suggestions");
            CitySuggestions::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGeocoder {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingGeocoder {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn search(&self, text: &str) -> Result<Vec<CityCandidate>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LookupError::Status { status: 500 });
            }
            Ok(vec![
                CityCandidate::new(format!("{text}, France"), 48.8566, 2.3522),
                CityCandidate::new(format!("{text}, Texas"), 33.6609, -95.5555),
            ])
        }
    }

    #[tokio::test]
    async fn test_short_query_skips_lookup() {
        let geocoder = CountingGeocoder::new(false);
        assert!(suggest_cities(&geocoder, "Lo").await.is_empty());
        assert!(suggest_cities(&geocoder, "  Lo  ").await.is_empty());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_query_counts_chars_not_bytes() {
        // Two characters, four bytes
        let geocoder = CountingGeocoder::new(false);
        assert!(suggest_cities(&geocoder, "Åå").await.is_empty());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_keeps_provider_order() {
        let geocoder = CountingGeocoder::new(false);
        let suggestions = suggest_cities(&geocoder, "Paris").await;
        let names: Vec<_> = suggestions.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["Paris, France", "Paris, Texas"]);

        // Restartable
        assert_eq!(suggestions.iter().count(), 2);
        assert_eq!(suggestions.pick(2).map(|c| c.display_name.as_str()), Some("Paris, Texas"));
        assert!(suggestions.pick(0).is_none());
        assert!(suggestions.pick(3).is_none());
    }

    #[tokio::test]
    async fn test_failure_is_soft() {
        let geocoder = CountingGeocoder::new(true);
        assert!(suggest_cities(&geocoder, "Paris").await.is_empty());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }
}
