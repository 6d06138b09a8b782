//! The ARISE pipeline for one idea
//!
//! scorer → phase selection → phase loop → legacy synthesis → refactoring
//! engine. Each step needs the previous step's full output; nothing runs on
//! partial state. Pipelines share no mutable state, so several can run at once.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{Config, SamplingConfig};
use crate::domain::{IdeaResult, Transcript};
use crate::events::EventBus;
use crate::llm::{LlmClient, LlmError, call_text};
use crate::orchestrator::PhaseOrchestrator;
use crate::phases::{ExampleSelector, determine_phases};
use crate::prompts::{ExamplePool, PromptError, PromptLoader};
use crate::refactor::{RefactorError, RefactoringEngine};
use crate::respondent::{Respondent, SimulatedRespondent};
use crate::scorer::VaguenessScorer;

/// User message for the legacy synthesis call
const LEGACY_SYNTHESIS_REQUEST: &str = "Please synthesize now.";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Idea text is empty")]
    EmptyIdea,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Refactoring failed: {0}")]
    Refactor(#[from] RefactorError),

    #[error("Input channel closed while waiting for an answer")]
    InputClosed,
}

#[derive(Serialize)]
struct ConversationContext<'a> {
    conversation: &'a str,
}

/// Runs ideas through scoring, questioning and refactoring
pub struct Pipeline {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    examples: ExamplePool,
    sampling: SamplingConfig,
    seed: Option<u64>,
    events: Arc<EventBus>,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: PromptLoader,
        sampling: SamplingConfig,
        seed: Option<u64>,
        events: Arc<EventBus>,
    ) -> Result<Self, PipelineError> {
        let examples = prompts.example_pool()?;
        Ok(Self {
            llm,
            prompts,
            examples,
            sampling,
            seed,
            events,
        })
    }

    /// Build a pipeline from configuration, loading prompt overrides relative to
    /// the current directory
    pub fn from_config(config: &Config, llm: Arc<dyn LlmClient>, events: Arc<EventBus>) -> Result<Self, PipelineError> {
        let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let prompts = PromptLoader::new(workdir, config.pipeline.prompts_dir.clone());
        Self::new(llm, prompts, config.sampling, config.pipeline.seed, events)
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Run one idea with a simulated respondent
    pub async fn run_simulated(&self, idea: &str) -> Result<IdeaResult, PipelineError> {
        let mut respondent =
            SimulatedRespondent::for_idea(self.llm.clone(), &self.prompts, idea, self.sampling.simulation.into())?;
        self.run_with(idea, &mut respondent).await
    }

    /// Run one idea with the given respondent
    pub async fn run_with(&self, idea: &str, respondent: &mut dyn Respondent) -> Result<IdeaResult, PipelineError> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(PipelineError::EmptyIdea);
        }
        let run_id = Uuid::now_v7();
        debug!(%run_id, idea_len = idea.len(), "Pipeline::run_with: called");
        let emitter = self.events.emitter_for(run_id.to_string());

        emitter.status("Scoring vagueness (inverted prompt)...");
        let scorer = VaguenessScorer::new(
            self.llm.clone(),
            self.prompts.load_template("vagueness")?,
            self.sampling.scoring.into(),
        );
        let assessment = scorer.score(idea).await?;
        let phases = determine_phases(&assessment.coverage);
        emitter.vagueness_scored(&assessment.score, &assessment.uncovered, &phases);

        let mut selector = match self.seed {
            Some(seed) => ExampleSelector::seeded(seed),
            None => ExampleSelector::from_entropy(),
        };
        let orchestrator = PhaseOrchestrator::new(
            self.llm.as_ref(),
            &self.prompts,
            &self.examples,
            self.sampling.questioning.into(),
            &emitter,
        );
        let outcome = orchestrator
            .run(idea, &phases, assessment.coverage.clone(), &mut selector, respondent)
            .await?;

        emitter.status("Synthesizing summary...");
        let synthesis = self.legacy_synthesis(&outcome.transcript).await?;
        emitter.legacy_synthesis(&synthesis);

        let engine = RefactoringEngine::new(self.llm.as_ref(), &self.prompts, self.sampling.stages(), &emitter);
        let refactored = engine.refactor(&outcome.transcript, &outcome.phases_executed).await?;
        emitter.refactored(&refactored);

        info!(
            %run_id,
            phases = outcome.phases_executed.len(),
            coverage = %outcome.coverage.score(),
            confidence = refactored.validation.confidence,
            "Idea processed"
        );

        Ok(IdeaResult {
            run_id,
            original_idea: idea.to_string(),
            timestamp: Utc::now(),
            vagueness_assessment: assessment,
            phases_executed: outcome.phases_executed,
            conversation: outcome.transcript.into_turns(),
            generic_flags: outcome.generic_flags,
            answer_source: respondent.source(),
            final_coverage: outcome.coverage,
            synthesis,
            refactored,
        })
    }

    /// Old-style free-text summary of the transcript
    async fn legacy_synthesis(&self, transcript: &Transcript) -> Result<String, PipelineError> {
        debug!(turns = transcript.len(), "Pipeline::legacy_synthesis: called");
        let conversation = transcript.render();
        let system = self.prompts.render(
            "synthesis",
            &ConversationContext {
                conversation: &conversation,
            },
        )?;
        Ok(call_text(
            self.llm.as_ref(),
            &system,
            LEGACY_SYNTHESIS_REQUEST,
            self.sampling.legacy_synthesis.into(),
        )
        .await?)
    }
}
