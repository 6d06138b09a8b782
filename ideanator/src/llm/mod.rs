//! LLM client module
//!
//! The pipeline depends on exactly one capability: send (system text, user
//! text, temperature, max tokens) and get text back, or an error it does not
//! interpret. [`call_text`] is that capability; [`LlmClient`] is the seam that
//! tests replace.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod openai;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, Sampling, StopReason, TokenUsage};

use crate::config::{LlmConfig, ResolvedLlmConfig};

/// Create an LLM client for the configured backend
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let resolved = config.resolve().map_err(|e| LlmError::Config(e.to_string()))?;
    create_client_from_resolved(&resolved)
}

/// Create an LLM client from a resolved configuration
pub fn create_client_from_resolved(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(backend = %config.backend, model = %config.model, "create_client_from_resolved: called");
    Ok(Arc::new(OpenAIClient::from_config(config)?))
}

/// Issue one single-turn call and return the reply text
///
/// A reply without text content is an error, not an empty string.
pub async fn call_text(
    llm: &dyn LlmClient,
    system_prompt: &str,
    user_message: &str,
    sampling: Sampling,
) -> Result<String, LlmError> {
    debug!(
        system_len = system_prompt.len(),
        user_len = user_message.len(),
        ?sampling,
        "call_text: called"
    );
    let request = CompletionRequest::single_turn(system_prompt, user_message, sampling);
    let response = llm.complete(request).await?;
    if response.stop_reason == StopReason::MaxTokens {
        debug!("call_text: reply truncated at max tokens");
    }
    response.content.ok_or(LlmError::EmptyResponse)
}
