//! Parsing Stage 3 (validation) output
//!
//! Confidence is the loop's exit condition, so it is strict: a missing or
//! out-of-range value is a hard error. The sub-results are read leniently.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::RefactorError;
use super::extract::parse_json_object;
use super::models::{CompletenessResult, FaithfulnessResult, IdeaSections, SycophancyResult, ValidationResult};

/// Parse validation output and re-check completeness against the parsed sections
pub fn parse_validation(raw: &str, sections: &IdeaSections) -> Result<ValidationResult, RefactorError> {
    debug!(raw_len = raw.len(), "parse_validation: called");
    let root = parse_json_object(raw).map_err(RefactorError::Validation)?;

    let confidence = match root.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| RefactorError::Validation("missing numeric \"confidence\"".to_string()))?;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(RefactorError::Validation(format!(
            "confidence {} is outside [0, 1]",
            confidence
        )));
    }

    let faithfulness: FaithfulnessResult = lenient(&root, "faithfulness");
    let mut completeness: CompletenessResult = lenient(&root, "completeness");
    let sycophancy: SycophancyResult = lenient(&root, "sycophancy");
    let critique = root
        .get("critique")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    enforce_completeness(&mut completeness, sections);

    Ok(ValidationResult {
        faithfulness,
        completeness,
        sycophancy,
        confidence,
        critique,
    })
}

fn lenient<T: DeserializeOwned + Default>(root: &Map<String, Value>, key: &str) -> T {
    match root.get(key) {
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!(%key, error = %e, "parse_validation: malformed sub-result, using defaults");
            T::default()
        }),
        None => T::default(),
    }
}

/// A section the model calls present but which parsed empty is forced to missing
fn enforce_completeness(completeness: &mut CompletenessResult, sections: &IdeaSections) {
    for (name, text) in sections.mandatory() {
        if !text.trim().is_empty() {
            continue;
        }
        let flag = match name {
            "problem" => &mut completeness.problem,
            "audience" => &mut completeness.audience,
            "solution" => &mut completeness.solution,
            _ => &mut completeness.differentiation,
        };
        *flag = false;
        if !completeness.missing.iter().any(|m| m.eq_ignore_ascii_case(name)) {
            completeness.missing.push(name.to_string());
        }
    }
}
