//! Ideanator configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::Sampling;
use crate::refactor::StageSampling;

/// Main Ideanator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM backend configuration
    pub llm: LlmConfig,

    /// Temperature and token budget per call kind
    pub sampling: SamplingConfig,

    /// Pipeline behaviour
    pub pipeline: PipelineConfig,

    /// Batch output
    pub output: OutputConfig,

    /// Log level used when none is given on the command line
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        self.llm.resolve()?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local .ideanator.yml, then ~/.config/ideanator/ideanator.yml
        for candidate in Self::search_paths() {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {:#}", candidate.display(), e);
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only `log-level`, following the same chain as [`Config::load`]
    ///
    /// Runs before logging is set up, so it stays silent and treats unreadable
    /// files as absent.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::search_paths(),
        };
        candidates
            .iter()
            .filter(|p| p.exists())
            .find_map(|p| {
                let content = fs::read_to_string(p).ok()?;
                serde_yaml::from_str::<Self>(&content).ok()
            })
            .and_then(|config| config.log_level)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".ideanator.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("ideanator").join("ideanator.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Which local or remote server answers model calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `mlx_lm.server` on Apple silicon
    #[default]
    Mlx,
    Ollama,
    /// Any OpenAI-compatible endpoint; model and base URL are required
    External,
}

impl Backend {
    fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Backend::Mlx => Some("http://localhost:8080"),
            Backend::Ollama => Some("http://localhost:11434"),
            Backend::External => None,
        }
    }

    fn default_model(&self) -> Option<&'static str> {
        match self {
            Backend::Mlx => Some("mlx-community/Llama-3.2-3B-Instruct-4bit"),
            Backend::Ollama => Some("llama3.2:3b"),
            Backend::External => None,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Mlx => "mlx",
            Backend::Ollama => "ollama",
            Backend::External => "external",
        };
        f.write_str(name)
    }
}

/// LLM backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: Backend,

    /// Model identifier; defaults per backend
    pub model: Option<String>,

    /// Server base URL; defaults per backend
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Upper bound on max tokens for any single call
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            model: None,
            base_url: None,
            api_key_env: "IDEANATOR_API_KEY".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Fill in backend defaults
    pub fn resolve(&self) -> Result<ResolvedLlmConfig> {
        let base_url = self
            .base_url
            .clone()
            .or_else(|| self.backend.default_base_url().map(String::from))
            .ok_or_else(|| eyre::eyre!("llm.base-url is required for the {} backend", self.backend))?;
        let model = self
            .model
            .clone()
            .or_else(|| self.backend.default_model().map(String::from))
            .ok_or_else(|| eyre::eyre!("llm.model is required for the {} backend", self.backend))?;

        Ok(ResolvedLlmConfig {
            backend: self.backend,
            model,
            base_url,
            api_key_env: self.api_key_env.clone(),
            max_tokens: self.max_tokens,
            timeout_ms: self.timeout_ms,
        })
    }
}

/// LLM configuration with every default applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLlmConfig {
    pub backend: Backend,
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl ResolvedLlmConfig {
    /// API key from the environment
    ///
    /// Local servers accept any bearer token, so a missing key is not an error.
    pub fn api_key(&self) -> String {
        std::env::var(&self.api_key_env).unwrap_or_else(|_| "local".to_string())
    }
}

/// Temperature and token budget for one kind of call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallSampling {
    pub temperature: f32,
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,
}

impl CallSampling {
    const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

impl From<CallSampling> for Sampling {
    fn from(c: CallSampling) -> Self {
        Sampling::new(c.temperature, c.max_tokens)
    }
}

/// Sampling per call kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SamplingConfig {
    /// Deterministic vagueness scoring
    pub scoring: CallSampling,
    /// Reflection plus two questions
    pub questioning: CallSampling,
    /// Simulated respondent
    pub simulation: CallSampling,
    pub legacy_synthesis: CallSampling,
    pub extract: CallSampling,
    pub synthesize: CallSampling,
    pub validate: CallSampling,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            scoring: CallSampling::new(0.0, 200),
            questioning: CallSampling::new(0.6, 250),
            simulation: CallSampling::new(0.7, 200),
            legacy_synthesis: CallSampling::new(0.3, 500),
            extract: CallSampling::new(0.3, 1200),
            synthesize: CallSampling::new(0.5, 900),
            validate: CallSampling::new(0.2, 700),
        }
    }
}

impl SamplingConfig {
    pub fn stages(&self) -> StageSampling {
        StageSampling {
            extract: self.extract.into(),
            synthesize: self.synthesize.into(),
            validate: self.validate.into(),
        }
    }
}

/// Pipeline behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Seed for few-shot example selection; random when unset
    pub seed: Option<u64>,

    /// Directory of `.pmt` overrides
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: Option<PathBuf>,
}

/// Batch output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where batch results are written
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("arise_results.json"),
        }
    }
}
