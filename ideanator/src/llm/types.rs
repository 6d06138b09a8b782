//! LLM request/response types
//!
//! Modelled on the OpenAI Chat Completions API, which every supported local
//! backend (MLX, Ollama, llama.cpp server) speaks.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sampling parameters for one model call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Sampling {
    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,

    /// Output token budget for this call
    pub max_tokens: u32,
}

impl Sampling {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction text
    pub system_prompt: String,

    /// User messages (the pipeline always sends exactly one)
    pub messages: Vec<Message>,

    /// Sampling temperature
    pub temperature: f32,

    /// Max tokens for the response
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Build a single-turn request from a system prompt and one user message
    pub fn single_turn(system_prompt: impl Into<String>, user_message: impl Into<String>, sampling: Sampling) -> Self {
        debug!(?sampling, "CompletionRequest::single_turn: called");
        Self {
            system_prompt: system_prompt.into(),
            messages: vec![Message::user(user_message)],
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
        }
    }

    /// Text of the first user message, if any
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        debug!("Message::assistant: called");
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token usage
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Convenience constructor for a plain text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
}

impl StopReason {
    /// Parse from an OpenAI `finish_reason` string
    pub fn from_openai(s: Option<&str>) -> Self {
        debug!(?s, "StopReason::from_openai: called");
        match s {
            Some("length") => {
                debug!("StopReason::from_openai: MaxTokens");
                StopReason::MaxTokens
            }
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Total tokens for this call
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
