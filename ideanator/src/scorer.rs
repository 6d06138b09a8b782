//! Inverted vagueness scoring
//!
//! The model is asked which dimensions are MISSING from the idea rather than
//! which are present. Small models tend to confirm sufficiency when asked the
//! direct question, and are far more willing to list gaps.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{Dimension, DimensionCoverage, VaguenessAssessment};
use crate::llm::{LlmClient, LlmError, Sampling, call_text};

/// Ideas shorter than this cannot plausibly cover all six dimensions
pub const VAGUENESS_WORD_THRESHOLD: usize = 20;

/// Reply token meaning "nothing is missing"
pub const NOTHING_MISSING_SENTINEL: &str = "none";

/// Scores an idea's coverage with one deterministic model call
pub struct VaguenessScorer {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    sampling: Sampling,
}

impl VaguenessScorer {
    pub fn new(llm: Arc<dyn LlmClient>, system_prompt: impl Into<String>, sampling: Sampling) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
            sampling,
        }
    }

    /// Score the idea; call failures propagate unchanged
    pub async fn score(&self, idea: &str) -> Result<VaguenessAssessment, LlmError> {
        debug!(idea_len = idea.len(), "VaguenessScorer::score: called");
        let raw = call_text(self.llm.as_ref(), &self.system_prompt, idea, self.sampling).await?;
        let coverage = interpret_reply(&raw, idea);
        info!(score = %coverage.score(), "Vagueness scored");
        Ok(VaguenessAssessment::new(coverage, raw))
    }
}

/// Turn a scorer reply into a coverage map
///
/// A dimension whose label appears in the (lower-cased) reply is not covered.
/// If the reply says nothing is missing but the idea is under the word
/// threshold, every dimension is forced to not covered.
pub fn interpret_reply(raw: &str, idea: &str) -> DimensionCoverage {
    let reply = raw.to_lowercase();
    let mut coverage = DimensionCoverage::all_covered();

    for dimension in Dimension::ALL {
        if reply.contains(dimension.key()) {
            coverage.mark_missing(dimension);
        }
    }

    let word_count = idea.split_whitespace().count();
    if reply.contains(NOTHING_MISSING_SENTINEL) && word_count < VAGUENESS_WORD_THRESHOLD {
        debug!(
            word_count,
            threshold = VAGUENESS_WORD_THRESHOLD,
            "interpret_reply: safety net triggered"
        );
        coverage.mark_all_missing();
    }

    coverage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::{MockLlmClient, MockReply};
    use proptest::prelude::*;

    const SHORT_IDEA: &str = "I want to build a language learning app.";

    #[test]
    fn test_named_dimensions_are_missing() {
        let cov = interpret_reply("CORE_PROBLEM, success_vision", &"word ".repeat(30));
        assert!(!cov.is_covered(Dimension::CoreProblem));
        assert!(!cov.is_covered(Dimension::SuccessVision));
        assert!(cov.is_covered(Dimension::PersonalMotivation));
        assert_eq!(cov.score(), "4/6");
    }

    #[test]
    fn test_all_named() {
        let raw = "personal_motivation, target_audience, core_problem, success_vision, constraints_risks, differentiation";
        assert_eq!(interpret_reply(raw, SHORT_IDEA).covered_count(), 0);
    }

    #[test]
    fn test_none_on_short_idea_triggers_safety_net() {
        let cov = interpret_reply("NONE", SHORT_IDEA);
        assert_eq!(cov.covered_count(), 0);
    }

    #[test]
    fn test_none_on_long_idea_is_trusted() {
        let long_idea = "I am a nurse and I want to build a scheduling tool for night-shift nurses in small rural \
                         hospitals who lose hours every week swapping shifts by text message";
        assert!(long_idea.split_whitespace().count() >= VAGUENESS_WORD_THRESHOLD);
        let cov = interpret_reply("NONE", long_idea);
        assert_eq!(cov.covered_count(), 6);
    }

    #[test]
    fn test_nineteen_words_still_short() {
        let idea = "word ".repeat(19);
        assert_eq!(interpret_reply("none", &idea).covered_count(), 0);
        let idea = "word ".repeat(20);
        assert_eq!(interpret_reply("none", &idea).covered_count(), 6);
    }

    #[tokio::test]
    async fn test_score_uses_deterministic_sampling() {
        let mock = Arc::new(MockLlmClient::new(["core_problem"]));
        let scorer = VaguenessScorer::new(mock.clone(), "what is missing?", Sampling::new(0.0, 200));

        let assessment = scorer.score(SHORT_IDEA).await.unwrap();
        assert_eq!(assessment.score, "5/6");
        assert_eq!(assessment.raw_response, "core_problem");

        let req = mock.request(0);
        assert_eq!(req.temperature, 0.0);
        assert_eq!(req.max_tokens, 200);
        assert_eq!(req.system_prompt, "what is missing?");
        assert_eq!(req.user_text(), Some(SHORT_IDEA));
    }

    #[tokio::test]
    async fn test_score_propagates_failure() {
        let mock = Arc::new(MockLlmClient::with_replies(vec![MockReply::Fail("down".into())]));
        let scorer = VaguenessScorer::new(mock, "p", Sampling::new(0.0, 200));
        assert!(scorer.score(SHORT_IDEA).await.is_err());
    }

    proptest! {
        #[test]
        fn prop_short_idea_with_none_is_all_missing(words in prop::collection::vec("[a-z]{1,8}", 1..20), noise in "[a-z ,.]{0,30}") {
            let idea = words.join(" ");
            let raw = format!("{} NONE {}", noise, noise);
            prop_assert_eq!(interpret_reply(&raw, &idea).covered_count(), 0);
        }
    }
}
