//! Phase selection and phase prompt building

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::domain::{Dimension, DimensionCoverage, Phase};
use crate::prompts::{ExamplePool, PhaseExample, PromptError, PromptLoader};

/// Phases to run for a coverage map
///
/// Anchor is always first and Scope always last. Reveal runs iff the core
/// problem is uncovered; Imagine runs iff the success vision is uncovered.
pub fn determine_phases(coverage: &DimensionCoverage) -> Vec<Phase> {
    let mut phases = vec![Phase::Anchor];
    if !coverage.is_covered(Dimension::CoreProblem) {
        phases.push(Phase::Reveal);
    }
    if !coverage.is_covered(Dimension::SuccessVision) {
        phases.push(Phase::Imagine);
    }
    phases.push(Phase::Scope);
    debug!(?phases, "determine_phases: selected");
    phases
}

/// Chooses one few-shot example per phase prompt
///
/// Randomness is confined here; scoring and coverage never see it.
pub struct ExampleSelector {
    rng: Box<dyn RngCore + Send>,
}

impl ExampleSelector {
    /// Reproducible selection from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        debug!(seed, "ExampleSelector::seeded: called");
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Selection seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    pub fn from_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    pub fn choose<'a>(&mut self, pool: &'a ExamplePool, phase: Phase) -> Option<&'a PhaseExample> {
        pool.for_phase(phase).choose(&mut self.rng)
    }
}

/// Text for the "still need" slot: up to three uncovered descriptions
pub fn still_need(phase: Phase, coverage: &DimensionCoverage) -> String {
    let uncovered = coverage.uncovered_descriptions();
    if uncovered.is_empty() {
        phase.default_need().to_string()
    } else {
        uncovered.into_iter().take(3).collect::<Vec<_>>().join(", ")
    }
}

#[derive(Debug, Serialize)]
struct PhasePromptContext<'a> {
    still_need: String,
    example_user: &'a str,
    example_response: &'a str,
    conversation: &'a str,
}

/// Render the system prompt for one phase
pub fn build_phase_prompt(
    loader: &PromptLoader,
    phase: Phase,
    conversation: &str,
    coverage: &DimensionCoverage,
    example: &PhaseExample,
) -> Result<String, PromptError> {
    debug!(%phase, conversation_len = conversation.len(), "build_phase_prompt: called");
    let context = PhasePromptContext {
        still_need: still_need(phase, coverage),
        example_user: &example.user,
        example_response: &example.response,
        conversation,
    };
    loader.render(phase.key(), &context)
}
