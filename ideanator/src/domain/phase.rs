//! The four question phases

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Dimension;

/// A fixed question round in the interrogation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Anchor,
    Reveal,
    Imagine,
    Scope,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Anchor, Phase::Reveal, Phase::Imagine, Phase::Scope];

    /// Dimensions marked covered once this phase completes
    pub fn dimensions(&self) -> &'static [Dimension] {
        match self {
            Phase::Anchor => &[Dimension::PersonalMotivation, Dimension::TargetAudience],
            Phase::Reveal => &[Dimension::CoreProblem],
            Phase::Imagine => &[Dimension::SuccessVision],
            Phase::Scope => &[Dimension::ConstraintsRisks, Dimension::Differentiation],
        }
    }

    /// The phase whose completion covers `dimension`
    pub fn covering(dimension: Dimension) -> Phase {
        match dimension {
            Dimension::PersonalMotivation | Dimension::TargetAudience => Phase::Anchor,
            Dimension::CoreProblem => Phase::Reveal,
            Dimension::SuccessVision => Phase::Imagine,
            Dimension::ConstraintsRisks | Dimension::Differentiation => Phase::Scope,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Phase::Anchor => "anchor",
            Phase::Reveal => "reveal",
            Phase::Imagine => "imagine",
            Phase::Scope => "scope",
        }
    }

    /// Display label used in the transcript and in progress events
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Anchor => "Phase 1 — ANCHOR (Personal Reality)",
            Phase::Reveal => "Phase 2 — REVEAL (Deeper Job)",
            Phase::Imagine => "Phase 3 — IMAGINE (Ideal Outcome)",
            Phase::Scope => "Phase 4 — SCOPE (Boundaries & Risks)",
        }
    }

    /// Fallback for the "still need" slot when every dimension is covered
    pub fn default_need(&self) -> &'static str {
        match self {
            Phase::Anchor => "their personal motivation",
            Phase::Reveal => "the deeper problem",
            Phase::Imagine => "their success vision",
            Phase::Scope => "constraints and risks",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_cover_every_dimension_once() {
        let mut all: Vec<Dimension> = Phase::ALL.iter().flat_map(|p| p.dimensions().iter().copied()).collect();
        all.sort();
        let mut expected = Dimension::ALL.to_vec();
        expected.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_covering_is_inverse_of_dimensions() {
        for phase in Phase::ALL {
            for d in phase.dimensions() {
                assert_eq!(Phase::covering(*d), phase);
            }
        }
    }

    #[test]
    fn test_anchor_and_scope_cover_four() {
        assert_eq!(Phase::Anchor.dimensions().len() + Phase::Scope.dimensions().len(), 4);
    }

    #[test]
    fn test_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Imagine).unwrap(), "\"imagine\"");
    }
}
