//! Negation-pattern contradiction detection
//!
//! A respondent who denies a topic in one phase ("I don't care about grammar")
//! and then discusses it in another ("grammar drills every day") has
//! contradicted themselves. The heuristic only compares respondent turns from
//! different phases.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::models::{Contradiction, ContradictionSource};
use crate::domain::ConversationTurn;
use crate::parser::STOP_WORDS;

const NEGATION_CUES: &[&str] = &[
    "not", "no", "never", "don't", "dont", "won't", "wont", "can't", "cant", "cannot", "isn't", "aren't", "doesn't",
    "didn't", "without",
];

/// Filler that carries no topic
const FILLER_WORDS: &[&str] = &[
    "just", "really", "like", "know", "think", "something", "things", "thing", "what", "when", "which", "there",
    "been", "were", "because", "very", "much", "even", "care", "sure", "want", "need",
];

/// Cue followed by these words is an idiom, not a denial ("can't wait", "no idea")
const NON_DENIAL_IDIOMS: &[(&str, &str)] = &[
    ("can't", "wait"),
    ("cant", "wait"),
    ("cannot", "wait"),
    ("not", "only"),
    ("not", "just"),
    ("not", "sure"),
    ("no", "idea"),
    ("no", "longer"),
    ("no", "doubt"),
];

/// Words that open a new clause and end a negation's reach
const CLAUSE_BREAKS: &[&str] = &["but", "and", "or", "though", "although", "while"];

/// Tokens after a cue that count as denied
const NEGATION_WINDOW: usize = 3;

const EXCERPT_CHARS: usize = 100;

const MIN_TOPIC_LEN: usize = 4;

/// One normalized word and whether punctuation closed its clause
#[derive(Debug)]
struct Token {
    word: String,
    ends_clause: bool,
}

fn tokenize(text: &str) -> Vec<Token> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split_whitespace()
        .filter_map(|raw| {
            let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
            (!word.is_empty()).then(|| Token {
                word: word.to_string(),
                ends_clause: raw.trim_end_matches(['"', '\'', ')']).ends_with([',', ';', ':', '.', '!', '?']),
            })
        })
        .collect()
}

fn is_idiom(cue: &str, next: Option<&Token>) -> bool {
    next.is_some_and(|n| NON_DENIAL_IDIOMS.contains(&(cue, n.word.as_str())))
}

#[derive(Debug, Default)]
struct Stance {
    denied: BTreeSet<String>,
    affirmed: BTreeSet<String>,
}

impl Stance {
    fn of(text: &str) -> Self {
        let tokens = tokenize(text);

        let mut denied_at = vec![false; tokens.len()];
        for (i, token) in tokens.iter().enumerate() {
            let is_cue = NEGATION_CUES.contains(&token.word.as_str());
            if !is_cue || token.ends_clause || is_idiom(&token.word, tokens.get(i + 1)) {
                continue;
            }
            let end = (i + 1 + NEGATION_WINDOW).min(tokens.len());
            for j in i + 1..end {
                if CLAUSE_BREAKS.contains(&tokens[j].word.as_str()) {
                    break;
                }
                denied_at[j] = true;
                if tokens[j].ends_clause {
                    break;
                }
            }
        }

        let mut stance = Stance::default();
        for (token, denied) in tokens.iter().zip(denied_at) {
            if !is_topic_word(&token.word) {
                continue;
            }
            if denied {
                stance.denied.insert(token.word.clone());
            } else {
                stance.affirmed.insert(token.word.clone());
            }
        }
        // A word both denied and used plainly in one turn is ambiguous
        stance.denied = stance.denied.difference(&stance.affirmed).cloned().collect();
        stance
    }

    /// First topic denied by one stance and affirmed by the other
    fn conflict(&self, other: &Stance) -> Option<String> {
        self.denied
            .intersection(&other.affirmed)
            .chain(other.denied.intersection(&self.affirmed))
            .min()
            .cloned()
    }
}

fn is_topic_word(token: &str) -> bool {
    token.chars().count() >= MIN_TOPIC_LEN
        && !STOP_WORDS.contains(&token)
        && !FILLER_WORDS.contains(&token)
        && !NEGATION_CUES.contains(&token)
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect::<String>().trim().to_string()
}

/// Scan respondent turns pairwise across phases
///
/// `turns` pairs each respondent turn with its 1-based transcript number.
pub fn detect_contradictions<'a>(turns: impl IntoIterator<Item = (usize, &'a ConversationTurn)>) -> Vec<Contradiction> {
    let turns: Vec<(usize, &ConversationTurn, Stance)> =
        turns.into_iter().map(|(n, t)| (n, t, Stance::of(&t.content))).collect();

    let mut found = Vec::new();
    for (i, (n_a, turn_a, stance_a)) in turns.iter().enumerate() {
        for (n_b, turn_b, stance_b) in &turns[i + 1..] {
            if turn_a.phase == turn_b.phase {
                continue;
            }
            if let Some(topic) = stance_a.conflict(stance_b) {
                debug!(earlier = n_a, later = n_b, %topic, "detect_contradictions: negation pair");
                found.push(Contradiction {
                    earlier: excerpt(&turn_a.content),
                    later: excerpt(&turn_b.content),
                    turns: Some(((*n_a).min(*n_b), (*n_a).max(*n_b))),
                    topic: Some(topic),
                    source: ContradictionSource::Detected,
                });
            }
        }
    }
    found
}

/// Extracted contradictions first, then detected ones for turn pairs not already listed
pub fn merge_contradictions(extracted: &[Contradiction], detected: Vec<Contradiction>) -> Vec<Contradiction> {
    let mut seen: HashSet<(usize, usize)> = extracted.iter().filter_map(|c| c.turns).collect();
    let mut merged = extracted.to_vec();
    for contradiction in detected {
        match contradiction.turns {
            Some(pair) if !seen.insert(pair) => continue,
            _ => merged.push(contradiction),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Phase, Transcript};
    use crate::parser::parse_structured_response;

    fn transcript(answers: &[(Phase, &str)]) -> Transcript {
        let mut t = Transcript::new("A language learning app");
        for (phase, answer) in answers {
            t.push_interviewer(*phase, parse_structured_response("[QUESTION 1] Tell me more?"));
            t.push_respondent(*phase, *answer);
        }
        t
    }

    #[test]
    fn test_denial_then_discussion_detected() {
        let t = transcript(&[
            (Phase::Anchor, "I don't care about grammar at all, just speaking."),
            (Phase::Reveal, "Grammar drills every day are the core of it."),
        ]);
        let found = detect_contradictions(t.respondent_turns());
        assert_eq!(found.len(), 1);
        let c = &found[0];
        assert_eq!(c.turns, Some((2, 4)));
        assert_eq!(c.topic.as_deref(), Some("grammar"));
        assert_eq!(c.source, ContradictionSource::Detected);
        assert!(c.earlier.starts_with("I don't care"));
    }

    #[test]
    fn test_curly_apostrophe_cue() {
        let t = transcript(&[
            (Phase::Anchor, "I won\u{2019}t charge for lessons."),
            (Phase::Scope, "Lessons cost ten dollars each."),
        ]);
        assert_eq!(detect_contradictions(t.respondent_turns()).len(), 1);
    }

    #[test]
    fn test_cant_wait_is_not_a_denial() {
        let t = transcript(&[
            (Phase::Anchor, "I can't wait to launch this for students."),
            (Phase::Scope, "We launch next spring at two schools."),
        ]);
        assert!(detect_contradictions(t.respondent_turns()).is_empty());
    }

    #[test]
    fn test_not_only_is_not_a_denial() {
        let t = transcript(&[
            (Phase::Anchor, "It is not only for students but teachers too."),
            (Phase::Scope, "Students are the main users."),
        ]);
        assert!(detect_contradictions(t.respondent_turns()).is_empty());
    }

    #[test]
    fn test_no_idea_is_not_a_denial() {
        let t = transcript(&[
            (Phase::Anchor, "I have no idea how big the market is."),
            (Phase::Scope, "The idea came from my trip."),
        ]);
        assert!(detect_contradictions(t.respondent_turns()).is_empty());
    }

    #[test]
    fn test_no_longer_is_not_a_denial() {
        let t = transcript(&[
            (Phase::Anchor, "I no longer teach evening classes."),
            (Phase::Scope, "Teach once, then reuse the recordings."),
        ]);
        assert!(detect_contradictions(t.respondent_turns()).is_empty());
    }

    #[test]
    fn test_not_sure_is_not_a_denial() {
        let t = transcript(&[
            (Phase::Anchor, "I'm not sure pricing works yet."),
            (Phase::Scope, "Pricing will be five dollars a month."),
        ]);
        assert!(detect_contradictions(t.respondent_turns()).is_empty());
    }

    #[test]
    fn test_comma_ends_negation() {
        let t = transcript(&[
            (Phase::Anchor, "I don't drive, buses are fine."),
            (Phase::Scope, "Buses run late on weekends."),
        ]);
        assert!(detect_contradictions(t.respondent_turns()).is_empty());
    }

    #[test]
    fn test_conjunction_ends_negation() {
        let t = transcript(&[
            (Phase::Anchor, "I don't drive and buses work."),
            (Phase::Scope, "Buses run late on weekends."),
        ]);
        assert!(detect_contradictions(t.respondent_turns()).is_empty());
    }

    #[test]
    fn test_denial_before_comma_still_counts() {
        let t = transcript(&[
            (Phase::Anchor, "Not for teenagers, mostly retirees."),
            (Phase::Imagine, "Teenagers would share it at school."),
        ]);
        let found = detect_contradictions(t.respondent_turns());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].topic.as_deref(), Some("teenagers"));
    }

    #[test]
    fn test_same_phase_ignored() {
        let t = transcript(&[
            (Phase::Anchor, "Not about grammar."),
            (Phase::Anchor, "Grammar is central."),
        ]);
        assert!(detect_contradictions(t.respondent_turns()).is_empty());
    }

    #[test]
    fn test_consistent_answers_yield_nothing() {
        let t = transcript(&[
            (Phase::Anchor, "I moved to Spain and struggled with conversation."),
            (Phase::Scope, "Conversation practice is expensive in Spain."),
        ]);
        assert!(detect_contradictions(t.respondent_turns()).is_empty());
    }

    #[test]
    fn test_excerpt_is_char_safe() {
        let long = "é".repeat(150);
        assert_eq!(excerpt(&long).chars().count(), EXCERPT_CHARS);
    }

    #[test]
    fn test_merge_dedupes_by_turn_pair() {
        let extracted = vec![
            Contradiction {
                earlier: "a".into(),
                later: "b".into(),
                turns: Some((2, 4)),
                topic: None,
                source: ContradictionSource::Extracted,
            },
            Contradiction {
                earlier: "c".into(),
                later: "d".into(),
                turns: None,
                topic: None,
                source: ContradictionSource::Extracted,
            },
        ];
        let detected = vec![
            Contradiction {
                earlier: "x".into(),
                later: "y".into(),
                turns: Some((2, 4)),
                topic: Some("grammar".into()),
                source: ContradictionSource::Detected,
            },
            Contradiction {
                earlier: "p".into(),
                later: "q".into(),
                turns: Some((4, 8)),
                topic: Some("pricing".into()),
                source: ContradictionSource::Detected,
            },
        ];
        let merged = merge_contradictions(&extracted, detected);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].earlier, "a");
        assert_eq!(merged[2].turns, Some((4, 8)));
    }
}
