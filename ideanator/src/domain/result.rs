//! Per-idea results as persisted in batch mode

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AnswerSource, ConversationTurn, DimensionCoverage, GenericFlag, Phase};
use crate::refactor::RefactoredIdea;

/// Scorer output: the initial coverage map plus the raw reply for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaguenessAssessment {
    #[serde(rename = "dimensions")]
    pub coverage: DimensionCoverage,
    pub score: String,
    pub uncovered: Vec<String>,
    pub raw_response: String,
}

impl VaguenessAssessment {
    pub fn new(coverage: DimensionCoverage, raw_response: impl Into<String>) -> Self {
        Self {
            score: coverage.score(),
            uncovered: coverage.uncovered_descriptions().into_iter().map(String::from).collect(),
            coverage,
            raw_response: raw_response.into(),
        }
    }
}

/// Complete record of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaResult {
    pub run_id: Uuid,
    pub original_idea: String,
    pub timestamp: DateTime<Utc>,
    pub vagueness_assessment: VaguenessAssessment,
    pub phases_executed: Vec<Phase>,
    pub conversation: Vec<ConversationTurn>,
    pub generic_flags: Vec<GenericFlag>,
    pub answer_source: AnswerSource,
    pub final_coverage: DimensionCoverage,
    pub synthesis: String,
    pub refactored: RefactoredIdea,
}
