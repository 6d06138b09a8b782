//! Respondents answer interviewer turns
//!
//! Batch runs use [`SimulatedRespondent`], a second model call role-playing the
//! idea's author. Interactive runs use [`ChannelRespondent`], which waits for a
//! human answer on an mpsc channel fed by the terminal front end.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::{AnswerSource, Phase};
use crate::llm::{LlmClient, Sampling, call_text};
use crate::pipeline::PipelineError;
use crate::prompts::{PromptError, PromptLoader};

/// What the respondent is answering
#[derive(Debug, Clone, Copy)]
pub struct RespondentTurn<'a> {
    pub phase: Phase,
    /// Tag-stripped interviewer text
    pub question: &'a str,
}

#[async_trait]
pub trait Respondent: Send {
    fn source(&self) -> AnswerSource;

    async fn answer(&mut self, turn: RespondentTurn<'_>) -> Result<String, PipelineError>;
}

/// Role-plays the idea's author with a higher-temperature model call
pub struct SimulatedRespondent {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    sampling: Sampling,
}

#[derive(Serialize)]
struct SimulatedUserContext<'a> {
    original_idea: &'a str,
}

impl SimulatedRespondent {
    /// Build a respondent for one idea
    pub fn for_idea(
        llm: Arc<dyn LlmClient>,
        prompts: &PromptLoader,
        idea: &str,
        sampling: Sampling,
    ) -> Result<Self, PromptError> {
        debug!(idea_len = idea.len(), "SimulatedRespondent::for_idea: called");
        let system_prompt = prompts.render("simulated-user", &SimulatedUserContext { original_idea: idea })?;
        Ok(Self {
            llm,
            system_prompt,
            sampling,
        })
    }
}

#[async_trait]
impl Respondent for SimulatedRespondent {
    fn source(&self) -> AnswerSource {
        AnswerSource::Simulated
    }

    async fn answer(&mut self, turn: RespondentTurn<'_>) -> Result<String, PipelineError> {
        debug!(phase = %turn.phase, "SimulatedRespondent::answer: called");
        Ok(call_text(self.llm.as_ref(), &self.system_prompt, turn.question, self.sampling).await?)
    }
}

/// Waits for human answers on a channel
///
/// The pipeline emits an awaiting-input event before each wait; whoever renders
/// events collects the answer and sends it on the paired [`mpsc::Sender`].
pub struct ChannelRespondent {
    answers: mpsc::Receiver<String>,
}

impl ChannelRespondent {
    pub fn new(answers: mpsc::Receiver<String>) -> Self {
        Self { answers }
    }

    /// Create a respondent and the sender that feeds it
    pub fn channel(buffer: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl Respondent for ChannelRespondent {
    fn source(&self) -> AnswerSource {
        AnswerSource::Human
    }

    async fn answer(&mut self, turn: RespondentTurn<'_>) -> Result<String, PipelineError> {
        debug!(phase = %turn.phase, "ChannelRespondent::answer: waiting for input");
        self.answers.recv().await.ok_or(PipelineError::InputClosed)
    }
}
