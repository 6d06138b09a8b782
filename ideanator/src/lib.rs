//! Ideanator - ARISE idea interrogation
//!
//! Takes a vague one-line idea and turns it into a structured, validated idea
//! statement by interviewing its author.
//!
//! # Core Concepts
//!
//! - **Inverted Scoring**: The model is asked what is missing, not what is present
//! - **Adaptive Phases**: Only the question phases the idea actually needs are run
//! - **Grounded Refactoring**: Extract, synthesize and validate against the transcript,
//!   with a bounded self-refine loop
//! - **Programmatic Checks**: Exploration status and contradictions come from the
//!   transcript, never from the model's self-report
//!
//! # Modules
//!
//! - [`llm`] - LLM client trait and OpenAI-compatible implementation
//! - [`parser`] - Interviewer reply parsing and generic-question detection
//! - [`scorer`] - Inverted vagueness scoring
//! - [`phases`] - Phase selection and phase prompt building
//! - [`orchestrator`] - The interview loop
//! - [`refactor`] - The three-stage refactoring engine
//! - [`pipeline`] - Everything above for one idea
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod events;
pub mod interactive;
pub mod llm;
pub mod orchestrator;
pub mod parser;
pub mod phases;
pub mod pipeline;
pub mod prompts;
pub mod refactor;
pub mod respondent;
pub mod scorer;
pub mod store;

// Re-export commonly used types
pub use config::{Backend, Config, LlmConfig, SamplingConfig};
pub use domain::{
    AnswerSource, ConversationTurn, Dimension, DimensionCoverage, GenericFlag, IdeaResult, Phase, Role, Transcript,
    VaguenessAssessment,
};
pub use events::{EventBus, EventEmitter, PipelineEvent, create_event_bus};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, Sampling, create_client};
pub use orchestrator::{InterviewOutcome, PhaseOrchestrator};
pub use parser::{ParsedResponse, is_question_generic, parse_structured_response};
pub use phases::{ExampleSelector, determine_phases};
pub use pipeline::{Pipeline, PipelineError};
pub use prompts::{ExamplePool, PromptError, PromptLoader};
pub use refactor::{RefactorError, RefactoredIdea, RefactoringEngine, ValidationResult};
pub use respondent::{ChannelRespondent, Respondent, RespondentTurn, SimulatedRespondent};
pub use scorer::VaguenessScorer;
pub use store::{BatchSummary, ResultStore, load_ideas};
