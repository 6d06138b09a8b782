//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Inverted vagueness scorer: asks what is missing
pub const VAGUENESS: &str = include_str!("../../prompts/vagueness.pmt");

pub const ANCHOR: &str = include_str!("../../prompts/anchor.pmt");
pub const REVEAL: &str = include_str!("../../prompts/reveal.pmt");
pub const IMAGINE: &str = include_str!("../../prompts/imagine.pmt");
pub const SCOPE: &str = include_str!("../../prompts/scope.pmt");

/// Persona for simulated respondent answers (batch mode)
pub const SIMULATED_USER: &str = include_str!("../../prompts/simulated-user.pmt");

/// Old-style free-text summary of the conversation
pub const SYNTHESIS: &str = include_str!("../../prompts/synthesis.pmt");

pub const EXTRACT: &str = include_str!("../../prompts/extract.pmt");
pub const EXTRACT_INPUT: &str = include_str!("../../prompts/extract-input.pmt");
pub const SYNTHESIZE: &str = include_str!("../../prompts/synthesize.pmt");
pub const SYNTHESIZE_INPUT: &str = include_str!("../../prompts/synthesize-input.pmt");
pub const VALIDATE: &str = include_str!("../../prompts/validate.pmt");
pub const VALIDATE_INPUT: &str = include_str!("../../prompts/validate-input.pmt");

/// Few-shot example pool, YAML keyed by phase
pub const EXAMPLES: &str = include_str!("../../prompts/examples.yml");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    let found = match name {
        "vagueness" => Some(VAGUENESS),
        "anchor" => Some(ANCHOR),
        "reveal" => Some(REVEAL),
        "imagine" => Some(IMAGINE),
        "scope" => Some(SCOPE),
        "simulated-user" => Some(SIMULATED_USER),
        "synthesis" => Some(SYNTHESIS),
        "extract" => Some(EXTRACT),
        "extract-input" => Some(EXTRACT_INPUT),
        "synthesize" => Some(SYNTHESIZE),
        "synthesize-input" => Some(SYNTHESIZE_INPUT),
        "validate" => Some(VALIDATE),
        "validate-input" => Some(VALIDATE_INPUT),
        _ => None,
    };
    if found.is_none() {
        debug!(%name, "get_embedded: no match found");
    }
    found
}
