//! Refactoring engine: transcript to structured idea statement
//!
//! Model-facing stages are strict. If extraction or validation output cannot be
//! parsed, or synthesis carries no section tags, the engine fails with a
//! [`RefactorError`] rather than passing partial structure downstream.

mod contradictions;
mod display;
mod engine;
mod exploration;
mod extract;
mod models;
mod sections;
mod validate;

use thiserror::Error;

use crate::llm::LlmError;
use crate::prompts::PromptError;

pub use contradictions::{detect_contradictions, merge_contradictions};
pub use engine::{RefactoringEngine, StageSampling};
pub use exploration::compute_exploration_status;
pub use extract::{extract_json, parse_extraction};
pub use models::{
    CompletenessResult, Contradiction, ContradictionSource, DimensionInsight, ExplorationLevel, ExplorationStatus,
    ExtractedInsights, FaithfulnessResult, IdeaSections, KeyPhrase, NOT_DISCUSSED, RefactoredIdea, Register, Severity,
    SycophancyResult, ValidationResult,
};
pub use sections::parse_synthesis_output;
pub use validate::parse_validation;

/// Below this the engine asks for another synthesis
pub const CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Refine rounds allowed after the first validation
pub const MAX_REFINE_ROUNDS: u32 = 2;

/// Respondent words in a phase needed for "well-explored"
pub const WELL_EXPLORED_WORDS: usize = 20;

/// Words the synthesis stage must not use
pub const BANNED_PHRASES: &[&str] = &[
    "innovative",
    "revolutionary",
    "game-changing",
    "cutting-edge",
    "robust",
    "seamless",
    "leverage",
    "synergy",
    "disruptive",
    "world-class",
    "next-generation",
    "best-in-class",
    "empower",
    "unlock",
    "holistic",
    "paradigm shift",
];

#[derive(Debug, Error)]
pub enum RefactorError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Extraction output unusable: {0}")]
    Extraction(String),

    #[error("Validation output unusable: {0}")]
    Validation(String),

    #[error("Synthesis output has no section tags")]
    UnstructuredSynthesis,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
