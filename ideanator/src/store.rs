//! Batch input and incremental result persistence
//!
//! Results are rewritten as one JSON array after every idea, so a failure
//! mid-batch loses only the idea in flight.

use std::fmt;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::domain::IdeaResult;

#[derive(Debug, Deserialize)]
struct IdeasFile {
    ideas: Vec<IdeaEntry>,
}

#[derive(Debug, Deserialize)]
struct IdeaEntry {
    content: String,
}

/// Read `{"ideas": [{"content": "..."}]}`, skipping blank entries
pub async fn load_ideas(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    debug!(?path, "load_ideas: called");
    let content = fs::read_to_string(path)
        .await
        .context(format!("Failed to read ideas file {}", path.display()))?;
    let file: IdeasFile =
        serde_json::from_str(&content).context(format!("Failed to parse ideas file {}", path.display()))?;

    let ideas: Vec<String> = file
        .ideas
        .into_iter()
        .map(|e| e.content.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    info!(count = ideas.len(), "Loaded ideas");
    Ok(ideas)
}

/// Accumulates results and persists them after each idea
pub struct ResultStore {
    path: PathBuf,
    results: Vec<IdeaResult>,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!(?path, "ResultStore::new: called");
        Self {
            path,
            results: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn results(&self) -> &[IdeaResult] {
        &self.results
    }

    /// Record a result and rewrite the results file
    ///
    /// Writes to a sibling temp file and renames it over the target, so a crash
    /// mid-write leaves the previous complete file in place.
    pub async fn append(&mut self, result: IdeaResult) -> Result<()> {
        debug!(run_id = %result.run_id, "ResultStore::append: called");
        self.results.push(result);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.results)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .context(format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .context(format!("Failed to replace {}", self.path.display()))?;

        info!(count = self.results.len(), path = %self.path.display(), "Results persisted");
        Ok(())
    }
}

/// Totals over a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub ideas: usize,
    pub total_phases: usize,
    pub generic_flags: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[IdeaResult]) -> Self {
        Self {
            ideas: results.len(),
            total_phases: results.iter().map(|r| r.phases_executed.len()).sum(),
            generic_flags: results.iter().map(|r| r.generic_flags.len()).sum(),
        }
    }

    pub fn average_phases(&self) -> f64 {
        if self.ideas == 0 {
            0.0
        } else {
            self.total_phases as f64 / self.ideas as f64
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ideas processed:     {}", self.ideas)?;
        writeln!(f, "Total phases:        {}", self.total_phases)?;
        writeln!(f, "Avg phases per idea: {:.1}", self.average_phases())?;
        write!(f, "Generic flags:       {}", self.generic_flags)
    }
}
