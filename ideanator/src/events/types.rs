//! Event types for pipeline progress streaming
//!
//! Emitted in this order over a full run: status, vagueness scored, then per
//! phase (phase started, interviewer text, respondent text or awaiting input,
//! zero or more generic flags), then legacy synthesis and the refactored result.

use serde::{Deserialize, Serialize};

use crate::domain::Phase;
use crate::refactor::RefactoredIdea;

/// Core event enum - the vocabulary of pipeline activity
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// Free-form progress message
    Status { run_id: String, message: String },

    /// The scorer produced the initial coverage map
    VaguenessScored {
        run_id: String,
        score: String,
        uncovered: Vec<String>,
        phases: Vec<Phase>,
    },

    /// A question phase has started
    PhaseStarted {
        run_id: String,
        phase: Phase,
        label: String,
        phase_index: usize,
        total_phases: usize,
    },

    /// The interviewer's (tag-stripped) text for a phase
    InterviewerText { run_id: String, phase: Phase, text: String },

    /// A simulated respondent answered
    RespondentText { run_id: String, phase: Phase, text: String },

    /// The pipeline is blocked on a human answer
    AwaitingInput { run_id: String, phase: Phase, label: String },

    /// A question shared no keyword with the idea
    GenericFlagged { run_id: String, phase: Phase, question: String },

    /// The old-style free-text summary
    LegacySynthesis { run_id: String, text: String },

    /// The refactoring engine finished
    Refactored {
        run_id: String,
        summary: String,
        idea: Box<RefactoredIdea>,
    },
}

impl PipelineEvent {
    /// Get the run ID for this event
    pub fn run_id(&self) -> &str {
        match self {
            PipelineEvent::Status { run_id, .. }
            | PipelineEvent::VaguenessScored { run_id, .. }
            | PipelineEvent::PhaseStarted { run_id, .. }
            | PipelineEvent::InterviewerText { run_id, .. }
            | PipelineEvent::RespondentText { run_id, .. }
            | PipelineEvent::AwaitingInput { run_id, .. }
            | PipelineEvent::GenericFlagged { run_id, .. }
            | PipelineEvent::LegacySynthesis { run_id, .. }
            | PipelineEvent::Refactored { run_id, .. } => run_id,
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            PipelineEvent::Status { .. } => "Status",
            PipelineEvent::VaguenessScored { .. } => "VaguenessScored",
            PipelineEvent::PhaseStarted { .. } => "PhaseStarted",
            PipelineEvent::InterviewerText { .. } => "InterviewerText",
            PipelineEvent::RespondentText { .. } => "RespondentText",
            PipelineEvent::AwaitingInput { .. } => "AwaitingInput",
            PipelineEvent::GenericFlagged { .. } => "GenericFlagged",
            PipelineEvent::LegacySynthesis { .. } => "LegacySynthesis",
            PipelineEvent::Refactored { .. } => "Refactored",
        }
    }
}
