//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

pub use ideanator::llm::client::mock::{MockLlmClient, MockReply};
use ideanator::{EventBus, Pipeline, PromptLoader, SamplingConfig};

pub const EXTRACTION: &str = r#"{
  "dimensions": {
    "motivation": "Moved to Spain and struggled at the bakery",
    "audience": "Adult expats in their first year abroad",
    "problem": "Classes are slow and abstract",
    "vision": "Order bread without switching to English",
    "risks": "No money for tutors"
  },
  "solution": "Daily five-minute drills built around real errands",
  "register": "casual",
  "key_phrases": ["real errands"],
  "contradictions": [],
  "unresolved": ["How will it make money?"]
}"#;

pub const SYNTHESIS: &str = "[ONE-LINER] Five-minute errand drills for new expats.
[PROBLEM] Classes teach grammar, not the bakery.
[AUDIENCE] Adult expats in their first year abroad.
[SOLUTION] Daily drills built around real errands.
[DIFFERENTIATOR] Every drill is a real errand.
[MOTIVATION] The author froze at a bakery counter.
[OPEN QUESTIONS]
- How will it make money?";

pub fn validation(confidence: f64) -> String {
    let critique = if confidence >= 0.8 { "PASS" } else { "Audience is too broad." };
    format!(r#"{{"confidence": {}, "critique": "{}"}}"#, confidence, critique)
}

pub fn pipeline(llm: Arc<MockLlmClient>) -> Pipeline {
    Pipeline::new(
        llm,
        PromptLoader::embedded_only(),
        SamplingConfig::default(),
        Some(42),
        Arc::new(EventBus::new(512)),
    )
    .expect("Failed to build pipeline")
}

/// A scripted transport failure
pub fn failure() -> MockReply {
    MockReply::Fail("model unloaded".to_string())
}
