//! Exploration status from conversation structure
//!
//! Never asks the model: a dimension is judged only by whether its phase ran and
//! how many words the respondent gave in that phase.

use std::collections::BTreeMap;

use super::WELL_EXPLORED_WORDS;
use super::models::{ExplorationLevel, ExplorationStatus};
use crate::domain::{ConversationTurn, Dimension, Phase, Role};

pub fn compute_exploration_status(turns: &[ConversationTurn], phases_executed: &[Phase]) -> ExplorationStatus {
    let mut words: BTreeMap<Phase, usize> = BTreeMap::new();
    for turn in turns.iter().filter(|t| t.role == Role::Respondent) {
        *words.entry(turn.phase).or_default() += turn.word_count();
    }

    let levels = Dimension::ALL
        .into_iter()
        .map(|dimension| {
            let phase = Phase::covering(dimension);
            let level = if !phases_executed.contains(&phase) {
                ExplorationLevel::NotExplored
            } else if words.get(&phase).copied().unwrap_or(0) >= WELL_EXPLORED_WORDS {
                ExplorationLevel::WellExplored
            } else {
                ExplorationLevel::PartiallyExplored
            };
            (dimension, level)
        })
        .collect();

    ExplorationStatus::new(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Transcript;
    use crate::parser::parse_structured_response;

    fn transcript(answers: &[(Phase, &str)]) -> Transcript {
        let mut t = Transcript::new("idea");
        for (phase, answer) in answers {
            t.push_interviewer(*phase, parse_structured_response("[QUESTION 1] Why?"));
            t.push_respondent(*phase, *answer);
        }
        t
    }

    #[test]
    fn test_levels_from_word_counts() {
        let long = "word ".repeat(25);
        let t = transcript(&[(Phase::Anchor, long.as_str()), (Phase::Scope, "too short")]);
        let status = compute_exploration_status(t.turns(), &[Phase::Anchor, Phase::Scope]);

        assert_eq!(status.get(Dimension::PersonalMotivation), ExplorationLevel::WellExplored);
        assert_eq!(status.get(Dimension::TargetAudience), ExplorationLevel::WellExplored);
        assert_eq!(status.get(Dimension::ConstraintsRisks), ExplorationLevel::PartiallyExplored);
        assert_eq!(status.get(Dimension::Differentiation), ExplorationLevel::PartiallyExplored);
        assert_eq!(status.get(Dimension::CoreProblem), ExplorationLevel::NotExplored);
        assert_eq!(status.get(Dimension::SuccessVision), ExplorationLevel::NotExplored);
    }

    #[test]
    fn test_exactly_threshold_is_well_explored() {
        let answer = "w ".repeat(WELL_EXPLORED_WORDS);
        let t = transcript(&[(Phase::Reveal, answer.as_str())]);
        let status = compute_exploration_status(t.turns(), &[Phase::Reveal]);
        assert_eq!(status.get(Dimension::CoreProblem), ExplorationLevel::WellExplored);
    }

    #[test]
    fn test_interviewer_words_do_not_count() {
        let mut t = Transcript::new("idea");
        let long_question = format!("[QUESTION 1] {}", "why ".repeat(40));
        t.push_interviewer(Phase::Imagine, parse_structured_response(&long_question));
        t.push_respondent(Phase::Imagine, "dunno");
        let status = compute_exploration_status(t.turns(), &[Phase::Imagine]);
        assert_eq!(status.get(Dimension::SuccessVision), ExplorationLevel::PartiallyExplored);
    }
}
