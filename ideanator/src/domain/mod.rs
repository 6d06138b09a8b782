//! Core domain types: dimensions, phases, the transcript and per-idea results

mod conversation;
mod dimension;
mod phase;
mod result;

pub use conversation::{AnswerSource, ConversationTurn, GenericFlag, Role, Transcript};
pub use dimension::{Dimension, DimensionCoverage};
pub use phase::Phase;
pub use result::{IdeaResult, VaguenessAssessment};
