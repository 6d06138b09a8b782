//! Conversation turns and the append-only transcript

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Phase;
use crate::parser::ParsedResponse;

/// Who spoke a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Interviewer,
    Respondent,
}

/// Where respondent answers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    Human,
    Simulated,
}

/// One entry in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub phase: Phase,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedResponse>,
}

impl ConversationTurn {
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// A question that shares no keyword with the idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericFlag {
    pub phase: Phase,
    pub question: String,
    pub flag: String,
}

impl GenericFlag {
    pub const REASON: &'static str = "GENERIC: could apply to any idea";

    pub fn new(phase: Phase, question: impl Into<String>) -> Self {
        Self {
            phase,
            question: question.into(),
            flag: Self::REASON.to_string(),
        }
    }
}

/// Ordered, append-only record of one idea's interrogation
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    idea: String,
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            turns: Vec::new(),
        }
    }

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn push_interviewer(&mut self, phase: Phase, parsed: ParsedResponse) {
        debug!(%phase, turn = self.turns.len() + 1, "Transcript::push_interviewer: called");
        self.turns.push(ConversationTurn {
            phase,
            role: Role::Interviewer,
            content: parsed.clean().to_string(),
            parsed: Some(parsed),
        });
    }

    pub fn push_respondent(&mut self, phase: Phase, answer: impl Into<String>) {
        debug!(%phase, turn = self.turns.len() + 1, "Transcript::push_respondent: called");
        self.turns.push(ConversationTurn {
            phase,
            role: Role::Respondent,
            content: answer.into(),
            parsed: None,
        });
    }

    /// Respondent turns paired with their 1-based turn numbers
    pub fn respondent_turns(&self) -> impl Iterator<Item = (usize, &ConversationTurn)> {
        self.turns
            .iter()
            .enumerate()
            .filter(|(_, t)| t.role == Role::Respondent)
            .map(|(i, t)| (i + 1, t))
    }

    /// Render the transcript as prompt text
    ///
    /// Turn numbers are 1-based so the extraction stage can cite them.
    pub fn render(&self) -> String {
        let mut out = format!("Original idea: {}\n", self.idea);
        for (i, turn) in self.turns.iter().enumerate() {
            let n = i + 1;
            let header = match turn.role {
                Role::Interviewer => format!("[Turn {} · Interviewer · {}]", n, turn.phase.label()),
                Role::Respondent => format!("[Turn {} · Respondent]", n),
            };
            out.push_str(&format!("\n{}:\n{}\n", header, turn.content));
        }
        out
    }

    pub fn into_turns(self) -> Vec<ConversationTurn> {
        self.turns
    }
}
