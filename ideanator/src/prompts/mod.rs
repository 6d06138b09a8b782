//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for every model call the
//! pipeline makes, plus the few-shot example pool.
//!
//! Template loading chain:
//! 1. `pipeline.prompts-dir` from config (user override)
//! 2. `.ideanator/prompts/{name}.pmt` (project-local override)
//! 3. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod examples;
mod loader;

pub use examples::{ExamplePool, PhaseExample};
pub use loader::{PromptError, PromptLoader};
