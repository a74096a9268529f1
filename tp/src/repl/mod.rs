//! Interactive REPL for the trip planner
//!
//! A line-oriented form: search cities, fill in the trip, generate, and
//! re-show the held trip without re-running anything.

mod session;

pub use session::ReplSession;

use std::sync::Arc;

use eyre::{Context, Result};

use crate::config::Config;
use crate::geoapify::GeoapifyClient;
use crate::itinerary::Assembler;
use crate::session::Session;

/// Run the interactive REPL
///
/// This is the main entry point for `tp repl`. Keys must already have been
/// validated.
pub async fn run_interactive(config: &Config) -> Result<()> {
    let geoapify = Arc::new(GeoapifyClient::from_config(&config.geoapify)?);
    let prompt_root = std::env::current_dir()?;
    let assembler =
        Assembler::from_config(config, geoapify.clone(), &prompt_root).context("Failed to create LLM client")?;

    let mut repl = ReplSession::new(Session::new(assembler), geoapify);
    repl.run().await
}
