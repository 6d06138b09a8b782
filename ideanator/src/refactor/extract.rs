//! Parsing Stage 1 (extraction) output
//!
//! Small models wrap JSON in code fences, add prose around it, shorten keys and
//! vary shapes. Everything optional is accepted leniently; a reply without a
//! JSON object or without a `dimensions` object is a hard error.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::RefactorError;
use super::models::{
    Contradiction, ContradictionSource, DimensionInsight, ExtractedInsights, KeyPhrase, NOT_DISCUSSED, Register,
};
use crate::domain::Dimension;

static FENCED_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid fence regex"));

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid number regex"));

/// Locate a JSON object in model output
///
/// Prefers a fenced block; otherwise takes the span from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(c) = FENCED_JSON_RE.captures(text)
        && let Some(m) = c.get(1)
    {
        return Some(m.as_str());
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a JSON object out of model output
pub(crate) fn parse_json_object(raw: &str) -> Result<serde_json::Map<String, Value>, String> {
    let json = extract_json(raw).ok_or_else(|| "no JSON object in reply".to_string())?;
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("JSON is not an object".to_string()),
        Err(e) => Err(format!("invalid JSON: {}", e)),
    }
}

/// Parse extraction output into insights
pub fn parse_extraction(raw: &str) -> Result<ExtractedInsights, RefactorError> {
    debug!(raw_len = raw.len(), "parse_extraction: called");
    let root = parse_json_object(raw).map_err(RefactorError::Extraction)?;

    let dims = root
        .get("dimensions")
        .and_then(Value::as_object)
        .ok_or_else(|| RefactorError::Extraction("missing \"dimensions\" object".to_string()))?;

    let mut dimensions: BTreeMap<Dimension, DimensionInsight> = BTreeMap::new();
    for (key, value) in dims {
        match key.parse::<Dimension>() {
            Ok(dimension) => {
                dimensions.insert(dimension, parse_dimension_insight(value));
            }
            Err(_) => debug!(%key, "parse_extraction: ignoring unknown dimension key"),
        }
    }
    for dimension in Dimension::ALL {
        dimensions.entry(dimension).or_insert_with(DimensionInsight::not_discussed);
    }

    let solution = root
        .get("solution")
        .map(value_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NOT_DISCUSSED.to_string());

    let key_phrases = array(&root, "key_phrases").iter().filter_map(parse_key_phrase).collect();
    let contradictions = array(&root, "contradictions")
        .iter()
        .filter_map(parse_contradiction)
        .collect();
    let unresolved = array(&root, "unresolved")
        .iter()
        .map(value_text)
        .filter(|s| !s.is_empty())
        .collect();
    let register = root
        .get("register")
        .or_else(|| root.get("user_register"))
        .and_then(Value::as_str)
        .map(|s| Register::from(s.to_string()))
        .unwrap_or_default();

    Ok(ExtractedInsights {
        dimensions,
        solution,
        key_phrases,
        contradictions,
        unresolved,
        register,
    })
}

fn array<'a>(root: &'a serde_json::Map<String, Value>, key: &str) -> &'a [Value] {
    match root.get(key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(%key, kind = ?other, "parse_extraction: expected an array, ignoring");
            &[]
        }
        None => &[],
    }
}

/// Render a scalar as text; strings are trimmed
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn turn_numbers(value: Option<&Value>) -> Vec<usize> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(as_turn).collect(),
        Some(Value::String(s)) => NUMBER_RE.find_iter(s).filter_map(|m| m.as_str().parse().ok()).collect(),
        Some(v) => as_turn(v).into_iter().collect(),
        None => Vec::new(),
    }
}

fn as_turn(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => NUMBER_RE.find(s).and_then(|m| m.as_str().parse().ok()),
        _ => None,
    }
}

fn parse_dimension_insight(value: &Value) -> DimensionInsight {
    let (text, turns) = match value {
        Value::Object(obj) => (
            obj.get("text").or_else(|| obj.get("summary")).map(value_text).unwrap_or_default(),
            turn_numbers(obj.get("turns").or_else(|| obj.get("turn"))),
        ),
        other => (value_text(other), Vec::new()),
    };
    if text.is_empty() {
        DimensionInsight::not_discussed()
    } else {
        DimensionInsight { text, turns }
    }
}

fn parse_key_phrase(value: &Value) -> Option<KeyPhrase> {
    let (phrase, turn) = match value {
        Value::String(s) => (s.trim().to_string(), None),
        Value::Object(obj) => (
            obj.get("phrase").or_else(|| obj.get("text")).map(value_text)?,
            obj.get("turn").and_then(as_turn),
        ),
        _ => return None,
    };
    (!phrase.is_empty()).then_some(KeyPhrase { phrase, turn })
}

fn parse_contradiction(value: &Value) -> Option<Contradiction> {
    let obj = value.as_object()?;
    let earlier = obj.get("earlier").map(value_text)?;
    let later = obj.get("later").map(value_text)?;
    let turns = match turn_numbers(obj.get("turns")).as_slice() {
        [a, b, ..] => Some((*a.min(b), *a.max(b))),
        _ => None,
    };
    Some(Contradiction {
        earlier,
        later,
        turns,
        topic: obj.get("topic").map(value_text).filter(|s| !s.is_empty()),
        source: ContradictionSource::Extracted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"Here is the extraction:
```json
{
  "dimensions": {
    "personal_motivation": { "text": "Moved to Spain and struggled", "turns": [2] },
    "audience": { "text": "Adult expats", "turns": [2, 4] },
    "core_problem": "Classes are too slow"
  },
  "solution": "Short daily conversation drills",
  "key_phrases": ["too slow", { "phrase": "I felt stupid at the bakery", "turn": 4 }],
  "contradictions": [
    { "earlier": "I don't care about grammar", "later": "Grammar drills every day", "turns": "Turn 6 vs Turn 2" },
    { "earlier": "a", "later": "b", "turns": [4, 8] }
  ],
  "unresolved": ["pricing"],
  "register": "Casual"
}
```
Hope this helps."#;

    #[test]
    fn test_extract_json_prefers_fence() {
        let json = extract_json("noise ```json\n{\"a\": 1}\n``` more {\"b\": 2}").unwrap();
        assert_eq!(json, "{\"a\": 1}");
    }

    #[test]
    fn test_extract_json_bare_object() {
        assert_eq!(extract_json("Sure! {\"a\": {\"b\": 1}} done").unwrap(), "{\"a\": {\"b\": 1}}");
        assert!(extract_json("no json here").is_none());
    }

    #[test]
    fn test_parse_full_extraction() {
        let insights = parse_extraction(FULL).unwrap();

        let motivation = insights.dimension(Dimension::PersonalMotivation).unwrap();
        assert_eq!(motivation.text, "Moved to Spain and struggled");
        assert_eq!(motivation.turns, vec![2]);
        assert_eq!(insights.dimension(Dimension::TargetAudience).unwrap().turns, vec![2, 4]);
        assert_eq!(insights.dimension(Dimension::CoreProblem).unwrap().text, "Classes are too slow");
        assert_eq!(insights.dimension(Dimension::SuccessVision).unwrap().text, NOT_DISCUSSED);
        assert_eq!(insights.dimensions.len(), 6);

        assert_eq!(insights.solution, "Short daily conversation drills");
        assert_eq!(insights.key_phrases.len(), 2);
        assert_eq!(insights.key_phrases[0].turn, None);
        assert_eq!(insights.key_phrases[1].turn, Some(4));

        assert_eq!(insights.contradictions[0].turns, Some((2, 6)));
        assert_eq!(insights.contradictions[1].turns, Some((4, 8)));
        assert!(insights
            .contradictions
            .iter()
            .all(|c| c.source == ContradictionSource::Extracted));
        assert_eq!(insights.unresolved, vec!["pricing".to_string()]);
        assert_eq!(insights.register, Register::Casual);
    }

    #[test]
    fn test_no_json_is_hard_error() {
        let err = parse_extraction("The problem is that classes are slow.").unwrap_err();
        assert!(matches!(err, RefactorError::Extraction(_)));
    }

    #[test]
    fn test_missing_dimensions_is_hard_error() {
        let err = parse_extraction(r#"{"solution": "x"}"#).unwrap_err();
        assert!(matches!(err, RefactorError::Extraction(msg) if msg.contains("dimensions")));
    }

    #[test]
    fn test_invalid_json_is_hard_error() {
        assert!(parse_extraction("{ dimensions: nope }").is_err());
    }

    #[test]
    fn test_minimal_extraction_defaults() {
        let insights = parse_extraction(r#"{"dimensions": {}}"#).unwrap();
        assert!(insights.dimensions.values().all(|d| !d.is_discussed()));
        assert_eq!(insights.solution, NOT_DISCUSSED);
        assert!(insights.key_phrases.is_empty());
        assert_eq!(insights.register, Register::Casual);
    }
}
