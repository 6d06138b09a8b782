//! Few-shot example pool for the question phases

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PromptError;
use crate::domain::Phase;

/// One worked example: an idea (or transcript) and an ideal tagged reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseExample {
    pub user: String,
    pub response: String,
}

/// Examples keyed by phase
///
/// The Anchor pool must be non-empty; other phases borrow it when their own
/// pool is missing or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExamplePool {
    by_phase: BTreeMap<Phase, Vec<PhaseExample>>,
}

impl ExamplePool {
    pub fn from_yaml(text: &str) -> Result<Self, PromptError> {
        debug!(len = text.len(), "ExamplePool::from_yaml: called");
        let pool: ExamplePool =
            serde_yaml::from_str(text).map_err(|e| PromptError::InvalidExamplePool(e.to_string()))?;
        pool.validate()?;
        Ok(pool)
    }

    pub fn new(by_phase: BTreeMap<Phase, Vec<PhaseExample>>) -> Result<Self, PromptError> {
        let pool = Self { by_phase };
        pool.validate()?;
        Ok(pool)
    }

    fn validate(&self) -> Result<(), PromptError> {
        if self.by_phase.get(&Phase::Anchor).is_none_or(|v| v.is_empty()) {
            return Err(PromptError::InvalidExamplePool(
                "the anchor pool must contain at least one example".to_string(),
            ));
        }
        Ok(())
    }

    /// Candidate examples for `phase`, falling back to the Anchor pool
    pub fn for_phase(&self, phase: Phase) -> &[PhaseExample] {
        match self.by_phase.get(&phase) {
            Some(examples) if !examples.is_empty() => examples,
            _ => {
                debug!(%phase, "ExamplePool::for_phase: no examples, borrowing anchor pool");
                self.by_phase.get(&Phase::Anchor).map(Vec::as_slice).unwrap_or(&[])
            }
        }
    }

    /// Total number of examples
    pub fn len(&self) -> usize {
        self.by_phase.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
