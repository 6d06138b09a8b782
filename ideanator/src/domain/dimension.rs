//! Dimensions and coverage tracking

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One of the six axes a complete idea statement must address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    PersonalMotivation,
    TargetAudience,
    CoreProblem,
    SuccessVision,
    ConstraintsRisks,
    Differentiation,
}

impl Dimension {
    /// All dimensions in canonical order
    pub const ALL: [Dimension; 6] = [
        Dimension::PersonalMotivation,
        Dimension::TargetAudience,
        Dimension::CoreProblem,
        Dimension::SuccessVision,
        Dimension::ConstraintsRisks,
        Dimension::Differentiation,
    ];

    /// Enumerated label, as the scorer prompt asks the model to spell it
    pub fn key(&self) -> &'static str {
        match self {
            Dimension::PersonalMotivation => "personal_motivation",
            Dimension::TargetAudience => "target_audience",
            Dimension::CoreProblem => "core_problem",
            Dimension::SuccessVision => "success_vision",
            Dimension::ConstraintsRisks => "constraints_risks",
            Dimension::Differentiation => "differentiation",
        }
    }

    /// Short name used in extraction output and exploration reports
    pub fn short_name(&self) -> &'static str {
        match self {
            Dimension::PersonalMotivation => "motivation",
            Dimension::TargetAudience => "audience",
            Dimension::CoreProblem => "problem",
            Dimension::SuccessVision => "vision",
            Dimension::ConstraintsRisks => "risks",
            Dimension::Differentiation => "differentiation",
        }
    }

    /// Human phrasing used in the phase prompts' "still need" slot
    pub fn description(&self) -> &'static str {
        match self {
            Dimension::PersonalMotivation => "their personal motivation and story",
            Dimension::TargetAudience => "who specifically this is for",
            Dimension::CoreProblem => "the specific pain point being solved",
            Dimension::SuccessVision => "what success looks like concretely",
            Dimension::ConstraintsRisks => "potential risks and what could go wrong",
            Dimension::Differentiation => "what makes this different from alternatives",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Dimension {
    type Err = String;

    /// Accepts either the enumerated label or the short name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace([' ', '-'], "_");
        Dimension::ALL
            .into_iter()
            .find(|d| d.key() == needle || d.short_name() == needle)
            .ok_or_else(|| format!("unknown dimension: {}", s))
    }
}

/// Covered / not-covered state for every dimension
///
/// Every dimension is present exactly once. The covered count is always derived
/// from the map, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Dimension, bool>", into = "BTreeMap<Dimension, bool>")]
pub struct DimensionCoverage {
    covered: BTreeMap<Dimension, bool>,
}

impl DimensionCoverage {
    /// Every dimension covered (the scorer's starting point)
    pub fn all_covered() -> Self {
        Self {
            covered: Dimension::ALL.into_iter().map(|d| (d, true)).collect(),
        }
    }

    /// Every dimension not covered
    pub fn all_missing() -> Self {
        Self {
            covered: Dimension::ALL.into_iter().map(|d| (d, false)).collect(),
        }
    }

    pub fn is_covered(&self, dimension: Dimension) -> bool {
        self.covered.get(&dimension).copied().unwrap_or(false)
    }

    pub fn mark_missing(&mut self, dimension: Dimension) {
        debug!(%dimension, "DimensionCoverage::mark_missing: called");
        self.covered.insert(dimension, false);
    }

    pub fn mark_all_missing(&mut self) {
        debug!("DimensionCoverage::mark_all_missing: called");
        *self = Self::all_missing();
    }

    pub fn mark_covered(&mut self, dimensions: &[Dimension]) {
        debug!(?dimensions, "DimensionCoverage::mark_covered: called");
        for d in dimensions {
            self.covered.insert(*d, true);
        }
    }

    pub fn covered_count(&self) -> usize {
        self.covered.values().filter(|v| **v).count()
    }

    /// "k/6" display score
    pub fn score(&self) -> String {
        format!("{}/{}", self.covered_count(), Dimension::ALL.len())
    }

    /// Uncovered dimensions in canonical order
    pub fn uncovered(&self) -> Vec<Dimension> {
        Dimension::ALL.into_iter().filter(|d| !self.is_covered(*d)).collect()
    }

    pub fn uncovered_descriptions(&self) -> Vec<&'static str> {
        self.uncovered().iter().map(|d| d.description()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, bool)> + '_ {
        self.covered.iter().map(|(d, v)| (*d, *v))
    }
}

impl Default for DimensionCoverage {
    fn default() -> Self {
        Self::all_covered()
    }
}

impl From<BTreeMap<Dimension, bool>> for DimensionCoverage {
    // Absent entries are treated as not covered
    fn from(map: BTreeMap<Dimension, bool>) -> Self {
        Self {
            covered: Dimension::ALL
                .into_iter()
                .map(|d| (d, map.get(&d).copied().unwrap_or(false)))
                .collect(),
        }
    }
}

impl From<DimensionCoverage> for BTreeMap<Dimension, bool> {
    fn from(coverage: DimensionCoverage) -> Self {
        coverage.covered
    }
}
