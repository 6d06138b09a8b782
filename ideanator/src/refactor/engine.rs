//! The three-stage refactoring engine
//!
//! Extract → Synthesize → Validate, then a bounded self-refine loop that feeds
//! the validator's critique back into synthesis. Exploration status and
//! contradiction detection run afterwards without any model call.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::contradictions::{detect_contradictions, merge_contradictions};
use super::exploration::compute_exploration_status;
use super::extract::parse_extraction;
use super::models::{ExtractedInsights, IdeaSections, RefactoredIdea, ValidationResult};
use super::sections::parse_synthesis_output;
use super::validate::parse_validation;
use super::{BANNED_PHRASES, CONFIDENCE_THRESHOLD, MAX_REFINE_ROUNDS, RefactorError};
use crate::domain::{Phase, Transcript};
use crate::events::EventEmitter;
use crate::llm::{LlmClient, Sampling, call_text};
use crate::prompts::PromptLoader;

/// Sampling for each engine stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageSampling {
    pub extract: Sampling,
    pub synthesize: Sampling,
    pub validate: Sampling,
}

impl Default for StageSampling {
    fn default() -> Self {
        Self {
            extract: Sampling::new(0.3, 1200),
            synthesize: Sampling::new(0.5, 900),
            validate: Sampling::new(0.2, 700),
        }
    }
}

/// One synthesized statement and its validation
#[derive(Debug)]
struct Draft {
    raw: String,
    sections: IdeaSections,
    validation: ValidationResult,
}

#[derive(Serialize)]
struct TranscriptContext<'a> {
    transcript: &'a str,
}

#[derive(Serialize)]
struct SynthesizeContext<'a> {
    register: &'a str,
    banned_phrases: String,
    critique: Option<&'a str>,
}

#[derive(Serialize)]
struct SynthesizeInput<'a> {
    insights: &'a str,
    transcript: &'a str,
}

#[derive(Serialize)]
struct ValidateInput<'a> {
    statement: &'a str,
    transcript: &'a str,
}

pub struct RefactoringEngine<'a> {
    llm: &'a dyn LlmClient,
    prompts: &'a PromptLoader,
    sampling: StageSampling,
    emitter: &'a EventEmitter,
}

impl<'a> RefactoringEngine<'a> {
    pub fn new(
        llm: &'a dyn LlmClient,
        prompts: &'a PromptLoader,
        sampling: StageSampling,
        emitter: &'a EventEmitter,
    ) -> Self {
        Self {
            llm,
            prompts,
            sampling,
            emitter,
        }
    }

    /// Refactor a finished transcript into a structured idea statement
    ///
    /// The refine loop runs while the latest confidence is below
    /// [`CONFIDENCE_THRESHOLD`], at most [`MAX_REFINE_ROUNDS`] times. The
    /// highest-confidence draft is returned with its own, unaltered validation.
    pub async fn refactor(
        &self,
        transcript: &Transcript,
        phases_executed: &[Phase],
    ) -> Result<RefactoredIdea, RefactorError> {
        debug!(turns = transcript.len(), ?phases_executed, "RefactoringEngine::refactor: called");
        let transcript_text = transcript.render();

        self.emitter.status("Stage 1: Extracting structured insights...");
        let insights = self.extract(&transcript_text).await?;
        let insights_json = serde_json::to_string_pretty(&insights)?;

        self.emitter.status("Stage 2: Synthesizing idea statement...");
        let mut best = self.draft(&insights, &insights_json, &transcript_text, None).await?;
        info!(confidence = best.validation.confidence, "Initial draft validated");

        let mut rounds = 0;
        let mut latest_confidence = best.validation.confidence;
        let mut critique = best.validation.feedback();
        while latest_confidence < CONFIDENCE_THRESHOLD && rounds < MAX_REFINE_ROUNDS {
            rounds += 1;
            info!(round = rounds, confidence = latest_confidence, "Refining synthesis");
            self.emitter.status(format!(
                "Refining (round {}/{}, confidence {:.2})...",
                rounds, MAX_REFINE_ROUNDS, latest_confidence
            ));

            let draft = self
                .draft(&insights, &insights_json, &transcript_text, Some(critique.as_str()))
                .await?;
            latest_confidence = draft.validation.confidence;
            critique = draft.validation.feedback();
            if draft.validation.confidence >= best.validation.confidence {
                best = draft;
            }
        }

        if best.validation.confidence < CONFIDENCE_THRESHOLD {
            warn!(
                confidence = best.validation.confidence,
                rounds, "Accepting best draft below confidence threshold"
            );
        }

        let exploration_status = compute_exploration_status(transcript.turns(), phases_executed);
        let detected = detect_contradictions(transcript.respondent_turns());
        let contradictions = merge_contradictions(&insights.contradictions, detected);

        Ok(RefactoredIdea {
            sections: best.sections,
            exploration_status,
            contradictions,
            validation: best.validation,
            refinement_rounds: rounds,
            insights,
            raw_synthesis: best.raw,
        })
    }

    async fn extract(&self, transcript_text: &str) -> Result<ExtractedInsights, RefactorError> {
        debug!("RefactoringEngine::extract: called");
        let system = self.prompts.load_template("extract")?;
        let user = self.prompts.render(
            "extract-input",
            &TranscriptContext {
                transcript: transcript_text,
            },
        )?;
        let raw = call_text(self.llm, &system, &user, self.sampling.extract).await?;
        parse_extraction(&raw)
    }

    /// Synthesize one statement and validate it
    async fn draft(
        &self,
        insights: &ExtractedInsights,
        insights_json: &str,
        transcript_text: &str,
        critique: Option<&str>,
    ) -> Result<Draft, RefactorError> {
        debug!(refine = critique.is_some(), "RefactoringEngine::draft: called");
        let system = self.prompts.render(
            "synthesize",
            &SynthesizeContext {
                register: insights.register.as_str(),
                banned_phrases: BANNED_PHRASES.join(", "),
                critique,
            },
        )?;
        let user = self.prompts.render(
            "synthesize-input",
            &SynthesizeInput {
                insights: insights_json,
                transcript: transcript_text,
            },
        )?;
        let raw = call_text(self.llm, &system, &user, self.sampling.synthesize).await?;
        let sections = parse_synthesis_output(&raw)?;

        self.emitter.status("Stage 3: Validating against transcript...");
        let system = self.prompts.load_template("validate")?;
        let user = self.prompts.render(
            "validate-input",
            &ValidateInput {
                statement: &raw,
                transcript: transcript_text,
            },
        )?;
        let reply = call_text(self.llm, &system, &user, self.sampling.validate).await?;
        let validation = parse_validation(&reply, &sections)?;

        Ok(Draft {
            raw,
            sections,
            validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Dimension;
    use crate::events::EventBus;
    use crate::llm::client::mock::{MockLlmClient, MockReply};
    use crate::parser::parse_structured_response;
    use crate::refactor::models::{ContradictionSource, ExplorationLevel};

    const EXTRACTION: &str = r#"{
  "dimensions": {
    "motivation": { "text": "Moved to Spain", "turns": [2] },
    "problem": { "text": "Classes are slow", "turns": [4] }
  },
  "solution": "Spoken drills",
  "key_phrases": ["felt stupid at the bakery"],
  "contradictions": [],
  "unresolved": ["pricing"],
  "register": "technical"
}"#;

    const SYNTHESIS_A: &str = "[ONE-LINER] Spoken drills for expats.
[PROBLEM] Classes are slow.
[AUDIENCE] Adult expats.
[SOLUTION] Ten-minute drills.
[DIFFERENTIATOR] Built from real errands.
[MOTIVATION] I moved to Spain.
[OPEN QUESTIONS]
- Pricing?";

    const SYNTHESIS_B: &str = "[ONE-LINER] A different take.
[PROBLEM] Slow classes.
[AUDIENCE] Expats.
[SOLUTION] Drills.
[DIFFERENTIATOR] Errands.";

    fn validation(confidence: f64) -> String {
        format!(r#"{{"confidence": {confidence}, "critique": "Audience claim at {confidence} is invented."}}"#)
    }

    fn transcript() -> Transcript {
        let mut t = Transcript::new("A language learning app");
        t.push_interviewer(Phase::Anchor, parse_structured_response("[QUESTION 1] Why languages?"));
        t.push_respondent(Phase::Anchor, "I don't care about grammar, I just want to talk to my neighbours in Spain every single day without freezing up.");
        t.push_interviewer(Phase::Scope, parse_structured_response("[QUESTION 1] Risks?"));
        t.push_respondent(Phase::Scope, "Grammar drills scare people off.");
        t
    }

    async fn run(mock: &MockLlmClient) -> Result<RefactoredIdea, RefactorError> {
        let loader = PromptLoader::embedded_only();
        let bus = EventBus::new(64);
        let emitter = bus.emitter_for("t");
        let engine = RefactoringEngine::new(mock, &loader, StageSampling::default(), &emitter);
        engine.refactor(&transcript(), &[Phase::Anchor, Phase::Scope]).await
    }

    #[tokio::test]
    async fn test_confident_first_draft_needs_no_refine() {
        let mock = MockLlmClient::new([EXTRACTION.to_string(), SYNTHESIS_A.to_string(), validation(0.9)]);
        let idea = run(&mock).await.unwrap();

        assert_eq!(mock.call_count(), 3);
        assert_eq!(idea.refinement_rounds, 0);
        assert_eq!(idea.validation.confidence, 0.9);
        assert_eq!(idea.sections.problem, "Classes are slow.");
        assert_eq!(idea.sections.open_questions, vec!["Pricing?"]);
        assert_eq!(idea.raw_synthesis, SYNTHESIS_A);
    }

    #[tokio::test]
    async fn test_stage_sampling_and_prompts() {
        let mock = MockLlmClient::new([EXTRACTION.to_string(), SYNTHESIS_A.to_string(), validation(0.9)]);
        run(&mock).await.unwrap();

        let extract = mock.request(0);
        assert_eq!((extract.temperature, extract.max_tokens), (0.3, 1200));
        assert!(extract.user_text().unwrap().contains("[Turn 2 · Respondent]"));

        let synth = mock.request(1);
        assert_eq!((synth.temperature, synth.max_tokens), (0.5, 900));
        assert!(synth.system_prompt.contains("technical register"));
        assert!(synth.system_prompt.contains("paradigm shift"));
        assert!(!synth.system_prompt.contains("PREVIOUS ATTEMPT CRITIQUE"));
        assert!(synth.user_text().unwrap().contains("Spoken drills"));

        let validate = mock.request(2);
        assert_eq!((validate.temperature, validate.max_tokens), (0.2, 700));
        assert!(validate.user_text().unwrap().contains("[ONE-LINER] Spoken drills for expats."));
    }

    #[tokio::test]
    async fn test_refine_loop_is_capped_and_keeps_best() {
        let mock = MockLlmClient::new([
            EXTRACTION.to_string(),
            SYNTHESIS_A.to_string(),
            validation(0.3),
            SYNTHESIS_B.to_string(),
            validation(0.6),
            SYNTHESIS_A.to_string(),
            validation(0.5),
            "never requested".to_string(),
        ]);
        let idea = run(&mock).await.unwrap();

        assert_eq!(mock.call_count(), 7);
        assert_eq!(idea.refinement_rounds, MAX_REFINE_ROUNDS);
        assert_eq!(idea.validation.confidence, 0.6);
        assert_eq!(idea.sections.one_liner, "A different take.");
    }

    #[tokio::test]
    async fn test_refine_injects_latest_critique() {
        let mock = MockLlmClient::new([
            EXTRACTION.to_string(),
            SYNTHESIS_A.to_string(),
            validation(0.4),
            SYNTHESIS_B.to_string(),
            validation(0.85),
        ]);
        let idea = run(&mock).await.unwrap();

        assert_eq!(idea.refinement_rounds, 1);
        let refine = mock.request(3);
        assert!(refine.system_prompt.contains("PREVIOUS ATTEMPT CRITIQUE"));
        assert!(refine.system_prompt.contains("Audience claim at 0.4 is invented."));
    }

    #[tokio::test]
    async fn test_exploration_status_ignores_synthesis_content() {
        let a = MockLlmClient::new([EXTRACTION.to_string(), SYNTHESIS_A.to_string(), validation(0.9)]);
        let b = MockLlmClient::new([EXTRACTION.to_string(), SYNTHESIS_B.to_string(), validation(0.95)]);
        let first = run(&a).await.unwrap();
        let second = run(&b).await.unwrap();

        assert_ne!(first.sections, second.sections);
        assert_eq!(first.exploration_status, second.exploration_status);
        assert_eq!(
            first.exploration_status.get(Dimension::PersonalMotivation),
            ExplorationLevel::WellExplored
        );
        assert_eq!(
            first.exploration_status.get(Dimension::ConstraintsRisks),
            ExplorationLevel::PartiallyExplored
        );
        assert_eq!(first.exploration_status.get(Dimension::CoreProblem), ExplorationLevel::NotExplored);
    }

    #[tokio::test]
    async fn test_detected_contradictions_merged() {
        let mock = MockLlmClient::new([EXTRACTION.to_string(), SYNTHESIS_A.to_string(), validation(0.9)]);
        let idea = run(&mock).await.unwrap();

        assert_eq!(idea.contradictions.len(), 1);
        assert_eq!(idea.contradictions[0].turns, Some((2, 4)));
        assert_eq!(idea.contradictions[0].source, ContradictionSource::Detected);
    }

    #[tokio::test]
    async fn test_unparseable_extraction_fails_loudly() {
        let mock = MockLlmClient::new(["The person wants an app."]);
        let err = run(&mock).await.unwrap_err();
        assert!(matches!(err, RefactorError::Extraction(_)));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unstructured_synthesis_fails() {
        let mock = MockLlmClient::new([EXTRACTION, "Here is a lovely summary."]);
        let err = run(&mock).await.unwrap_err();
        assert!(matches!(err, RefactorError::UnstructuredSynthesis));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let mock = MockLlmClient::with_replies(vec![
            MockReply::Text(EXTRACTION.to_string()),
            MockReply::Fail("backend down".to_string()),
        ]);
        let err = run(&mock).await.unwrap_err();
        assert!(matches!(err, RefactorError::Llm(_)));
    }
}
