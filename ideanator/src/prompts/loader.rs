//! Prompt Loader
//!
//! Loads prompt templates from override directories or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::embedded;
use super::examples::ExamplePool;

/// Errors from loading or rendering prompt templates
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt template not found: {0}")]
    NotFound(String),

    #[error("Failed to read prompt {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template {name}: {message}")]
    Render { name: String, message: String },

    #[error("Invalid example pool: {0}")]
    InvalidExamplePool(String),
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// Configured override directory (`pipeline.prompts-dir`)
    user_dir: Option<PathBuf>,
    /// Project-local directory (`.ideanator/prompts/` under the working dir)
    local_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader rooted at `workdir`, with an optional configured override directory
    pub fn new(workdir: impl AsRef<Path>, user_dir: Option<PathBuf>) -> Self {
        let workdir = workdir.as_ref();
        debug!(?workdir, ?user_dir, "PromptLoader::new: called");
        let local_dir = workdir.join(".ideanator/prompts");

        let user_dir = user_dir.filter(|d| {
            let exists = d.is_dir();
            if !exists {
                debug!(?d, "PromptLoader::new: configured prompts dir does not exist, ignoring");
            }
            exists
        });
        let local_dir = if local_dir.is_dir() {
            debug!(?local_dir, "PromptLoader::new: local override directory found");
            Some(local_dir)
        } else {
            None
        };

        Self {
            hbs: Self::engine(),
            user_dir,
            local_dir,
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
            local_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text, never HTML
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Read `file_name` from the first override directory that has it
    fn read_override(&self, file_name: &str) -> Result<Option<String>, PromptError> {
        for dir in [self.user_dir.as_ref(), self.local_dir.as_ref()].into_iter().flatten() {
            let path = dir.join(file_name);
            if path.exists() {
                debug!(?path, "PromptLoader::read_override: found override");
                return std::fs::read_to_string(&path)
                    .map(Some)
                    .map_err(|source| PromptError::Read { path, source });
            }
            debug!(?path, "PromptLoader::read_override: not found");
        }
        Ok(None)
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Configured override: `{prompts-dir}/{name}.pmt`
    /// 2. Local override: `.ideanator/prompts/{name}.pmt`
    /// 3. Embedded fallback
    pub fn load_template(&self, name: &str) -> Result<String, PromptError> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(content) = self.read_override(&format!("{}.pmt", name))? {
            return Ok(content);
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| PromptError::NotFound(name.to_string()))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String, PromptError> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| PromptError::Render {
                name: template_name.to_string(),
                message: e.to_string(),
            })
    }

    /// Load the few-shot example pool (`examples.yml`)
    pub fn example_pool(&self) -> Result<ExamplePool, PromptError> {
        debug!("PromptLoader::example_pool: called");
        let text = match self.read_override("examples.yml")? {
            Some(text) => text,
            None => embedded::EXAMPLES.to_string(),
        };
        let pool = ExamplePool::from_yaml(&text)?;
        info!(examples = pool.len(), "Loaded example pool");
        Ok(pool)
    }
}
