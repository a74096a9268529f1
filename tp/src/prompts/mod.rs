//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for place suggestions.
//!
//! Template loading chain:
//! 1. `.tripplanner/prompts/{name}.pmt` (user override)
//! 2. `prompts/{name}.pmt` (working directory default)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{PlacesPromptContext, PromptLoader};
