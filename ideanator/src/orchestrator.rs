//! Phase orchestration: the interview loop
//!
//! For each selected phase: render the phase prompt, ask the model for a
//! reflection and two questions, parse the reply, get the respondent's answer,
//! then mark the phase's dimensions covered. Coverage records that a dimension
//! was asked about, not how well it was answered.

use tracing::{debug, info};

use crate::domain::{AnswerSource, DimensionCoverage, GenericFlag, Phase, Transcript};
use crate::events::EventEmitter;
use crate::llm::{LlmClient, Sampling, call_text};
use crate::parser::{is_question_generic, parse_structured_response};
use crate::phases::{ExampleSelector, build_phase_prompt};
use crate::pipeline::PipelineError;
use crate::prompts::{ExamplePool, PromptError, PromptLoader};
use crate::respondent::{Respondent, RespondentTurn};

/// Everything the interview loop produced for one idea
#[derive(Debug, Clone)]
pub struct InterviewOutcome {
    pub transcript: Transcript,
    pub phases_executed: Vec<Phase>,
    pub generic_flags: Vec<GenericFlag>,
    pub coverage: DimensionCoverage,
}

/// Drives the question phases for one idea
pub struct PhaseOrchestrator<'a> {
    llm: &'a dyn LlmClient,
    prompts: &'a PromptLoader,
    examples: &'a ExamplePool,
    sampling: Sampling,
    emitter: &'a EventEmitter,
}

impl<'a> PhaseOrchestrator<'a> {
    pub fn new(
        llm: &'a dyn LlmClient,
        prompts: &'a PromptLoader,
        examples: &'a ExamplePool,
        sampling: Sampling,
        emitter: &'a EventEmitter,
    ) -> Self {
        Self {
            llm,
            prompts,
            examples,
            sampling,
            emitter,
        }
    }

    /// Run `phases` in order
    ///
    /// Anchor's user message is the idea itself; every later phase receives the
    /// whole transcript so far. Model call failures propagate without retry.
    pub async fn run(
        &self,
        idea: &str,
        phases: &[Phase],
        mut coverage: DimensionCoverage,
        selector: &mut ExampleSelector,
        respondent: &mut dyn Respondent,
    ) -> Result<InterviewOutcome, PipelineError> {
        debug!(?phases, initial = %coverage.score(), "PhaseOrchestrator::run: called");
        let mut transcript = Transcript::new(idea);
        let mut phases_executed = Vec::with_capacity(phases.len());
        let mut generic_flags = Vec::new();

        for (index, &phase) in phases.iter().enumerate() {
            self.emitter.phase_started(phase, index, phases.len());

            let example = selector.choose(self.examples, phase).ok_or_else(|| {
                PromptError::InvalidExamplePool(format!("no examples available for {}", phase))
            })?;
            let conversation = transcript.render();
            let system_prompt = build_phase_prompt(self.prompts, phase, &conversation, &coverage, example)?;
            let user_message = match phase {
                Phase::Anchor => idea,
                _ => conversation.as_str(),
            };

            let raw = call_text(self.llm, &system_prompt, user_message, self.sampling).await?;
            let parsed = parse_structured_response(&raw);
            self.emitter.interviewer_text(phase, parsed.clean());

            let flagged: Vec<GenericFlag> = parsed
                .questions()
                .iter()
                .filter(|q| is_question_generic(q, idea))
                .map(|q| GenericFlag::new(phase, q.as_str()))
                .collect();

            let question = parsed.clean().to_string();
            transcript.push_interviewer(phase, parsed);

            if respondent.source() == AnswerSource::Human {
                self.emitter.awaiting_input(phase);
            }
            let answer = respondent
                .answer(RespondentTurn {
                    phase,
                    question: &question,
                })
                .await?;
            if respondent.source() == AnswerSource::Simulated {
                self.emitter.respondent_text(phase, &answer);
            }
            transcript.push_respondent(phase, answer);

            for flag in &flagged {
                self.emitter.generic_flagged(phase, &flag.question);
            }
            generic_flags.extend(flagged);

            coverage.mark_covered(phase.dimensions());
            phases_executed.push(phase);
            info!(%phase, coverage = %coverage.score(), "Phase completed");
        }

        Ok(InterviewOutcome {
            transcript,
            phases_executed,
            generic_flags,
            coverage,
        })
    }
}
