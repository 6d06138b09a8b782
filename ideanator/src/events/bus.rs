//! Event Bus - pub/sub for pipeline progress
//!
//! The pipeline emits typed events; presentation layers (terminal renderer,
//! tests) subscribe. The core never calls back into a consumer.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use super::types::PipelineEvent;
use crate::domain::Phase;
use crate::refactor::RefactoredIdea;

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1_024;

/// Central event bus for pipeline activity
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Create a new event bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers
    ///
    /// Fire-and-forget: with no subscribers the event is dropped.
    pub fn emit(&self, event: PipelineEvent) {
        debug!(event_type = event.event_type(), run_id = event.run_id(), "EventBus::emit");
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Create an emitter handle bound to one pipeline run
    pub fn emitter_for(&self, run_id: impl Into<String>) -> EventEmitter {
        let run_id = run_id.into();
        debug!(%run_id, "EventBus::emitter_for: creating emitter");
        EventEmitter {
            tx: self.tx.clone(),
            run_id,
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Handle for components to emit events without owning the bus
#[derive(Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<PipelineEvent>,
    run_id: String,
}

impl EventEmitter {
    /// Get the run ID this emitter is bound to
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Emit a raw event
    pub fn emit(&self, event: PipelineEvent) {
        debug!(event_type = event.event_type(), "EventEmitter::emit");
        let _ = self.tx.send(event);
    }

    // === Convenience methods ===

    pub fn status(&self, message: impl Into<String>) {
        self.emit(PipelineEvent::Status {
            run_id: self.run_id.clone(),
            message: message.into(),
        });
    }

    pub fn vagueness_scored(&self, score: &str, uncovered: &[String], phases: &[Phase]) {
        self.emit(PipelineEvent::VaguenessScored {
            run_id: self.run_id.clone(),
            score: score.to_string(),
            uncovered: uncovered.to_vec(),
            phases: phases.to_vec(),
        });
    }

    pub fn phase_started(&self, phase: Phase, phase_index: usize, total_phases: usize) {
        self.emit(PipelineEvent::PhaseStarted {
            run_id: self.run_id.clone(),
            phase,
            label: phase.label().to_string(),
            phase_index,
            total_phases,
        });
    }

    pub fn interviewer_text(&self, phase: Phase, text: &str) {
        self.emit(PipelineEvent::InterviewerText {
            run_id: self.run_id.clone(),
            phase,
            text: text.to_string(),
        });
    }

    pub fn respondent_text(&self, phase: Phase, text: &str) {
        self.emit(PipelineEvent::RespondentText {
            run_id: self.run_id.clone(),
            phase,
            text: text.to_string(),
        });
    }

    pub fn awaiting_input(&self, phase: Phase) {
        self.emit(PipelineEvent::AwaitingInput {
            run_id: self.run_id.clone(),
            phase,
            label: phase.label().to_string(),
        });
    }

    pub fn generic_flagged(&self, phase: Phase, question: &str) {
        self.emit(PipelineEvent::GenericFlagged {
            run_id: self.run_id.clone(),
            phase,
            question: question.to_string(),
        });
    }

    pub fn legacy_synthesis(&self, text: &str) {
        self.emit(PipelineEvent::LegacySynthesis {
            run_id: self.run_id.clone(),
            text: text.to_string(),
        });
    }

    pub fn refactored(&self, idea: &RefactoredIdea) {
        self.emit(PipelineEvent::Refactored {
            run_id: self.run_id.clone(),
            summary: idea.to_string(),
            idea: Box::new(idea.clone()),
        });
    }
}

/// Create an event bus wrapped in an Arc for shared ownership
pub fn create_event_bus() -> Arc<EventBus> {
    Arc::new(EventBus::with_default_capacity())
}
