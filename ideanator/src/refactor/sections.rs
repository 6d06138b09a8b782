//! Parsing Stage 2 (synthesis) output into display sections

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::RefactorError;
use super::models::IdeaSections;

/// Section tags, case-insensitive, colon optional
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(ONE[- ]?LINER|PROBLEM|AUDIENCE|SOLUTION|DIFFERENTIATOR|MOTIVATION|OPEN QUESTIONS?)\]\s*:?")
        .expect("valid section regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    OneLiner,
    Problem,
    Audience,
    Solution,
    Differentiator,
    Motivation,
    OpenQuestions,
}

impl Section {
    fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.to_uppercase();
        match tag.as_str() {
            "PROBLEM" => Some(Section::Problem),
            "AUDIENCE" => Some(Section::Audience),
            "SOLUTION" => Some(Section::Solution),
            "DIFFERENTIATOR" => Some(Section::Differentiator),
            "MOTIVATION" => Some(Section::Motivation),
            t if t.starts_with("ONE") => Some(Section::OneLiner),
            t if t.starts_with("OPEN") => Some(Section::OpenQuestions),
            _ => None,
        }
    }
}

/// Split synthesis output into sections
///
/// Each section runs to the next recognized tag; the first occurrence of a tag
/// wins. Output with no recognized tag at all is an error.
pub fn parse_synthesis_output(raw: &str) -> Result<IdeaSections, RefactorError> {
    debug!(raw_len = raw.len(), "parse_synthesis_output: called");
    let tags: Vec<(Section, usize, usize)> = SECTION_RE
        .captures_iter(raw)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let section = Section::from_tag(c.get(1)?.as_str())?;
            Some((section, whole.start(), whole.end()))
        })
        .collect();

    if tags.is_empty() {
        return Err(RefactorError::UnstructuredSynthesis);
    }

    let body = |section: Section| -> String {
        tags.iter()
            .position(|(s, _, _)| *s == section)
            .map(|idx| {
                let start = tags[idx].2;
                let end = tags.get(idx + 1).map(|t| t.1).unwrap_or(raw.len());
                raw[start..end].trim().to_string()
            })
            .unwrap_or_default()
    };

    Ok(IdeaSections {
        one_liner: body(Section::OneLiner),
        problem: body(Section::Problem),
        audience: body(Section::Audience),
        solution: body(Section::Solution),
        differentiator: body(Section::Differentiator),
        motivation: body(Section::Motivation),
        open_questions: parse_bullets(&body(Section::OpenQuestions)),
    })
}

/// Bulleted lines (`-`, `*`, `•`); plain non-empty lines if nothing is bulleted
fn parse_bullets(text: &str) -> Vec<String> {
    let bulleted: Vec<String> = text
        .lines()
        .filter_map(|l| l.trim().strip_prefix(['-', '*', '•']))
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if !bulleted.is_empty() {
        return bulleted;
    }
    text.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "[ONE-LINER] Daily drills for expats who freeze at the bakery.
[PROBLEM]: Classes move too slowly for adults who need to speak now.
[AUDIENCE] Adult expats in their first year abroad.
[SOLUTION] Ten-minute spoken drills built from real errands.
[DIFFERENTIATOR] Practice scripts come from my own errands, not textbooks.
[MOTIVATION] I moved to Spain and felt stupid ordering bread.
[OPEN QUESTIONS]
- How do I price it?
• Which city first?
";

    #[test]
    fn test_parse_all_sections() {
        let s = parse_synthesis_output(OUTPUT).unwrap();
        assert_eq!(s.one_liner, "Daily drills for expats who freeze at the bakery.");
        assert_eq!(s.problem, "Classes move too slowly for adults who need to speak now.");
        assert_eq!(s.audience, "Adult expats in their first year abroad.");
        assert_eq!(s.solution, "Ten-minute spoken drills built from real errands.");
        assert_eq!(s.differentiator, "Practice scripts come from my own errands, not textbooks.");
        assert_eq!(s.motivation, "I moved to Spain and felt stupid ordering bread.");
        assert_eq!(s.open_questions, vec!["How do I price it?", "Which city first?"]);
    }

    #[test]
    fn test_tags_case_insensitive() {
        let s = parse_synthesis_output("[one liner] hi\n[Problem] slow\n[open question]\nwhat next?").unwrap();
        assert_eq!(s.one_liner, "hi");
        assert_eq!(s.problem, "slow");
        assert_eq!(s.open_questions, vec!["what next?"]);
    }

    #[test]
    fn test_missing_section_is_empty() {
        let s = parse_synthesis_output("[PROBLEM] slow classes").unwrap();
        assert_eq!(s.problem, "slow classes");
        assert!(s.differentiator.is_empty());
        assert!(s.open_questions.is_empty());
    }

    #[test]
    fn test_untagged_output_is_error() {
        assert!(matches!(
            parse_synthesis_output("My idea is great."),
            Err(RefactorError::UnstructuredSynthesis)
        ));
    }

    #[test]
    fn test_brackets_inside_text_survive() {
        let s = parse_synthesis_output("[PROBLEM] costs [roughly] too much\n[AUDIENCE] me").unwrap();
        assert_eq!(s.problem, "costs [roughly] too much");
    }
}
