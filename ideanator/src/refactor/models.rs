//! Data contracts between the refactoring stages

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Dimension;

/// Placeholder text for a dimension the transcript never covers
pub const NOT_DISCUSSED: &str = "NOT DISCUSSED";

/// Summary of one dimension with the transcript turns it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionInsight {
    pub text: String,
    #[serde(default)]
    pub turns: Vec<usize>,
}

impl DimensionInsight {
    pub fn not_discussed() -> Self {
        Self {
            text: NOT_DISCUSSED.to_string(),
            turns: Vec::new(),
        }
    }

    pub fn is_discussed(&self) -> bool {
        !self.text.trim().is_empty() && !self.text.trim().eq_ignore_ascii_case(NOT_DISCUSSED)
    }
}

/// A verbatim respondent phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPhrase {
    pub phrase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<usize>,
}

/// Where a contradiction was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContradictionSource {
    /// Reported by the extraction stage
    Extracted,
    /// Found by the negation heuristic
    Detected,
}

/// Two respondent statements that disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    pub earlier: String,
    pub later: String,
    /// 1-based turn numbers, earlier first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turns: Option<(usize, usize)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub source: ContradictionSource,
}

/// How the respondent writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Register {
    #[default]
    Casual,
    Formal,
    Technical,
}

impl Register {
    pub fn as_str(&self) -> &'static str {
        match self {
            Register::Casual => "casual",
            Register::Formal => "formal",
            Register::Technical => "technical",
        }
    }
}

impl From<String> for Register {
    fn from(s: String) -> Self {
        let s = s.to_lowercase();
        if s.contains("technical") {
            Register::Technical
        } else if s.contains("formal") && !s.contains("informal") {
            Register::Formal
        } else {
            Register::Casual
        }
    }
}

/// Stage 1 output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInsights {
    /// Always holds all six dimensions
    pub dimensions: BTreeMap<Dimension, DimensionInsight>,
    pub solution: String,
    pub key_phrases: Vec<KeyPhrase>,
    pub contradictions: Vec<Contradiction>,
    pub unresolved: Vec<String>,
    pub register: Register,
}

impl ExtractedInsights {
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionInsight> {
        self.dimensions.get(&dimension)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaithfulnessResult {
    pub supported_count: u32,
    pub implied_count: u32,
    pub unsupported_count: u32,
    pub unsupported_claims: Vec<String>,
}

/// Are the four mandatory sections present and non-empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletenessResult {
    pub problem: bool,
    pub audience: bool,
    pub solution: bool,
    pub differentiation: bool,
    pub missing: Vec<String>,
}

impl CompletenessResult {
    pub fn is_complete(&self) -> bool {
        self.problem && self.audience && self.solution && self.differentiation
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    #[default]
    None,
    Mild,
    Significant,
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "mild" => Severity::Mild,
            "significant" | "severe" | "high" => Severity::Significant,
            _ => Severity::None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SycophancyResult {
    pub flags: Vec<String>,
    pub severity: Severity,
}

/// Stage 3 output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub faithfulness: FaithfulnessResult,
    pub completeness: CompletenessResult,
    pub sycophancy: SycophancyResult,
    /// In [0, 1]
    pub confidence: f64,
    pub critique: String,
}

impl ValidationResult {
    /// Critique text for the next synthesis attempt
    ///
    /// Falls back to a summary of the checks when the model left the critique empty.
    pub fn feedback(&self) -> String {
        let critique = self.critique.trim();
        if !critique.is_empty() && !critique.eq_ignore_ascii_case("pass") {
            return critique.to_string();
        }

        let mut lines = vec![format!("Confidence was {:.2}.", self.confidence)];
        if !self.completeness.missing.is_empty() {
            lines.push(format!("Missing sections: {}.", self.completeness.missing.join(", ")));
        }
        if !self.faithfulness.unsupported_claims.is_empty() {
            lines.push(format!(
                "Remove unsupported claims: {}.",
                self.faithfulness.unsupported_claims.join("; ")
            ));
        }
        if !self.sycophancy.flags.is_empty() {
            lines.push(format!("Tone down: {}.", self.sycophancy.flags.join("; ")));
        }
        lines.join(" ")
    }
}

/// Parsed synthesis text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeaSections {
    pub one_liner: String,
    pub problem: String,
    pub audience: String,
    pub solution: String,
    pub differentiator: String,
    pub motivation: String,
    pub open_questions: Vec<String>,
}

impl IdeaSections {
    /// Mandatory sections as (name, text)
    pub fn mandatory(&self) -> [(&'static str, &str); 4] {
        [
            ("problem", self.problem.as_str()),
            ("audience", self.audience.as_str()),
            ("solution", self.solution.as_str()),
            ("differentiation", self.differentiator.as_str()),
        ]
    }
}

/// How thoroughly a dimension was discussed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationLevel {
    WellExplored,
    PartiallyExplored,
    NotExplored,
}

impl ExplorationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ExplorationLevel::WellExplored => "Well-explored",
            ExplorationLevel::PartiallyExplored => "Partially explored",
            ExplorationLevel::NotExplored => "Not yet explored",
        }
    }
}

/// Exploration level per dimension, computed from the transcript alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExplorationStatus {
    levels: BTreeMap<Dimension, ExplorationLevel>,
}

impl ExplorationStatus {
    pub fn new(levels: BTreeMap<Dimension, ExplorationLevel>) -> Self {
        Self { levels }
    }

    pub fn get(&self, dimension: Dimension) -> ExplorationLevel {
        self.levels.get(&dimension).copied().unwrap_or(ExplorationLevel::NotExplored)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, ExplorationLevel)> + '_ {
        Dimension::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

/// Final output of the refactoring engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefactoredIdea {
    #[serde(flatten)]
    pub sections: IdeaSections,
    pub exploration_status: ExplorationStatus,
    pub contradictions: Vec<Contradiction>,
    pub validation: ValidationResult,
    /// Refine rounds run after the first validation, at most two
    pub refinement_rounds: u32,
    pub insights: ExtractedInsights,
    pub raw_synthesis: String,
}
