//! Per-user session state
//!
//! A [`Session`] owns the trip holder and the single visible notice. It is
//! an ordinary value owned by whichever front end drives it; nothing here is
//! global. `generate` takes `&mut self`, so one session can never have two
//! runs in flight.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::TripResult;
use crate::itinerary::{Assembler, PipelineState, TripForm};

/// Holds the latest Ready trip
///
/// The whole trip is swapped on `replace`; readers get a shared snapshot that
/// never changes underneath them.
#[derive(Debug, Clone, Default)]
pub struct TripState {
    current: Option<Arc<TripResult>>,
}

impl TripState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<TripResult>> {
        self.current.clone()
    }

    pub fn replace(&mut self, trip: TripResult) {
        debug!(city = %trip.city_name, stops = trip.stops.len(), "TripState::replace: called");
        self.current = Some(Arc::new(trip));
    }
}

/// The one message shown to the user at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Warning(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Error(m) | Notice::Warning(m) => m,
        }
    }
}

/// What a `generate` call did
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    /// The form was incomplete; nothing ran
    Skipped,
    /// A new trip is held; `warning` is set when the route is missing
    Ready { warning: Option<String> },
    /// The run failed; the previous trip (if any) is still held
    Failed { error: String },
}

/// One user's interactive lifetime
pub struct Session {
    id: Uuid,
    assembler: Assembler,
    trips: TripState,
    state: PipelineState,
    notice: Option<Notice>,
}

impl Session {
    pub fn new(assembler: Assembler) -> Self {
        let id = Uuid::now_v7();
        debug!(session_id = %id, "Session::new: called");
        Self {
            id,
            assembler,
            trips: TripState::new(),
            state: PipelineState::Idle,
            notice: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Latest Ready trip, if any
    pub fn current_trip(&self) -> Option<Arc<TripResult>> {
        self.trips.current()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Run the pipeline for the form's contents
    ///
    /// An incomplete form is a no-op. Otherwise the previous notice is
    /// cleared, and the held trip is replaced only if the run reaches Ready.
    pub async fn generate(&mut self, form: &TripForm) -> GenerateOutcome {
        let session_id = self.id;
        debug!(%session_id, "Session::generate: called");

        let request = match form.request() {
            None => {
                debug!(%session_id, "Session::generate: form incomplete, staying idle");
                return GenerateOutcome::Skipped;
            }
            Some(Err(e)) => {
                warn!(%session_id, error = %e, "Rejected trip request");
                let error = e.to_string();
                self.notice = Some(Notice::Error(error.clone()));
                return GenerateOutcome::Failed { error };
            }
            Some(Ok(request)) => request,
        };

        self.notice = None;
        let mut last = self.state;
        let result = self
            .assembler
            .assemble(&request, |state| {
                debug!(%session_id, %state, "Session::generate: state change");
                last = state;
            })
            .await;
        self.state = last;

        match result {
            Ok(assembly) => {
                info!(%session_id, city = %assembly.trip.city_name, "Trip ready");
                self.trips.replace(assembly.trip);
                self.notice = assembly.warning.clone().map(Notice::Warning);
                GenerateOutcome::Ready {
                    warning: assembly.warning,
                }
            }
            Err(e) => {
                warn!(%session_id, error = %e, "Trip generation failed");
                let error = e.to_string();
                self.notice = Some(Notice::Error(error.clone()));
                GenerateOutcome::Failed { error }
            }
        }
    }
}
