//! Response parsing and generic-question detection
//!
//! Interviewer replies are expected to carry `[REFLECTION]`, `[QUESTION 1]` and
//! `[QUESTION 2]` tags, but small models often ignore the format. A reply that
//! carries none of them is still usable: it becomes [`ParsedResponse::Fallback`]
//! and its raw text is shown as-is.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Section tags, case-sensitive, colon optional
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(REFLECTION|QUESTION 1|QUESTION 2)\]:?").expect("valid tag regex"));

/// Common verbs and pronouns that say nothing about a specific idea
pub const STOP_WORDS: &[&str] = &[
    "want", "make", "create", "build", "develop", "design", "that", "helps", "people", "with", "their", "them",
    "this", "would", "platform", "allows", "from", "about", "have", "will", "into", "your", "they", "could",
    "should", "more", "most", "also",
];

/// Minimum keyword length (in characters) for the generic check
const MIN_KEYWORD_LEN: usize = 4;

/// One parsed interviewer reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedResponse {
    /// At least one tagged section had content
    Structured {
        reflection: Option<String>,
        questions: Vec<String>,
        raw: String,
        clean: String,
    },
    /// No usable tags; the raw text stands in for everything
    Fallback { raw: String },
}

impl ParsedResponse {
    /// Tag-stripped display text; the raw reply for the fallback variant
    pub fn clean(&self) -> &str {
        match self {
            ParsedResponse::Structured { clean, .. } => clean,
            ParsedResponse::Fallback { raw } => raw,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            ParsedResponse::Structured { raw, .. } | ParsedResponse::Fallback { raw } => raw,
        }
    }

    pub fn reflection(&self) -> Option<&str> {
        match self {
            ParsedResponse::Structured { reflection, .. } => reflection.as_deref(),
            ParsedResponse::Fallback { .. } => None,
        }
    }

    /// Extracted questions, at most two
    pub fn questions(&self) -> &[String] {
        match self {
            ParsedResponse::Structured { questions, .. } => questions,
            ParsedResponse::Fallback { .. } => &[],
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ParsedResponse::Structured { .. })
    }
}

/// Parse a tagged interviewer reply
///
/// Each section runs from its tag to the next recognized tag (or end of text).
/// The first occurrence of a tag wins. Never fails.
pub fn parse_structured_response(raw: &str) -> ParsedResponse {
    debug!(raw_len = raw.len(), "parse_structured_response: called");

    let tags: Vec<(&str, usize, usize)> = TAG_RE
        .captures_iter(raw)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let name = c.get(1)?.as_str();
            Some((name, whole.start(), whole.end()))
        })
        .collect();

    let section = |name: &str| -> Option<String> {
        let idx = tags.iter().position(|(n, _, _)| *n == name)?;
        let (_, _, body_start) = tags[idx];
        let body_end = tags.get(idx + 1).map(|(_, start, _)| *start).unwrap_or(raw.len());
        let body = raw[body_start..body_end].trim();
        (!body.is_empty()).then(|| body.to_string())
    };

    let reflection = section("REFLECTION");
    let questions: Vec<String> = ["QUESTION 1", "QUESTION 2"].into_iter().filter_map(section).collect();

    if reflection.is_none() && questions.is_empty() {
        if !raw.trim().is_empty() {
            warn!("parse_structured_response: no tagged sections, falling back to raw text");
        }
        return ParsedResponse::Fallback { raw: raw.to_string() };
    }

    let clean = reflection
        .iter()
        .chain(questions.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n");

    debug!(
        has_reflection = reflection.is_some(),
        question_count = questions.len(),
        "parse_structured_response: structured"
    );
    ParsedResponse::Structured {
        reflection,
        questions,
        raw: raw.to_string(),
        clean,
    }
}

/// Keywords of an idea: punctuation-stripped, lower-cased tokens of four or
/// more characters that are not stop words
pub fn idea_keywords(idea: &str) -> BTreeSet<String> {
    idea.split_whitespace()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()).to_lowercase())
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// True if the question mentions none of the idea's keywords
pub fn is_question_generic(question: &str, idea: &str) -> bool {
    let question = question.to_lowercase();
    let generic = !idea_keywords(idea).iter().any(|kw| question.contains(kw.as_str()));
    debug!(%generic, "is_question_generic: called");
    generic
}
