//! Plain-text rendering of a refactored idea

use std::fmt;

use super::models::{ContradictionSource, RefactoredIdea};

fn section(f: &mut fmt::Formatter<'_>, title: &str, text: &str) -> fmt::Result {
    if text.trim().is_empty() {
        return Ok(());
    }
    writeln!(f, "{}:", title)?;
    writeln!(f, "  {}", text.trim())?;
    writeln!(f)
}

impl fmt::Display for RefactoredIdea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.sections;
        if !s.one_liner.trim().is_empty() {
            writeln!(f, "{}", s.one_liner.trim())?;
            writeln!(f)?;
        }
        section(f, "The problem", &s.problem)?;
        section(f, "Who it's for", &s.audience)?;
        section(f, "The solution", &s.solution)?;
        section(f, "What makes it different", &s.differentiator)?;
        section(f, "Why me", &s.motivation)?;

        if !s.open_questions.is_empty() {
            writeln!(f, "Open questions:")?;
            for q in &s.open_questions {
                writeln!(f, "  - {}", q)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Exploration status:")?;
        for (dimension, level) in self.exploration_status.iter() {
            writeln!(f, "  {:<16} {}", dimension.short_name(), level.label())?;
        }

        if !self.contradictions.is_empty() {
            writeln!(f)?;
            writeln!(f, "Contradictions:")?;
            for c in &self.contradictions {
                let turns = c
                    .turns
                    .map(|(a, b)| format!("turns {} and {}", a, b))
                    .unwrap_or_else(|| "turns unknown".to_string());
                let origin = match c.source {
                    ContradictionSource::Extracted => "extracted",
                    ContradictionSource::Detected => "detected",
                };
                writeln!(f, "  - ({}, {}) \"{}\" vs \"{}\"", turns, origin, c.earlier, c.later)?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "Confidence: {:.2} after {} refinement round{}",
            self.validation.confidence,
            self.refinement_rounds,
            if self.refinement_rounds == 1 { "" } else { "s" }
        )
    }
}
