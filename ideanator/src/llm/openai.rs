//! OpenAI-compatible chat completions client
//!
//! MLX (`mlx_lm.server`), Ollama and most hosted gateways expose the same
//! `/v1/chat/completions` endpoint, so one client covers every backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, TokenUsage};
use crate::config::ResolvedLlmConfig;

/// Extra attempts after the first for transient failures
const MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubles each attempt
const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Fallback when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 10;

pub struct OpenAIClient {
    model: String,
    api_key: String,
    endpoint: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAIClient {
    pub fn from_config(config: &ResolvedLlmConfig) -> Result<Self, LlmError> {
        debug!(backend = %config.backend, model = %config.model, "OpenAIClient::from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key: config.api_key(),
            endpoint: chat_endpoint(&config.base_url),
            http,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// System prompt first, then the request's messages; per-call budget capped by config
    fn chat_request<'r>(&'r self, request: &'r CompletionRequest) -> ChatRequest<'r> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ChatMessage {
            role: "system",
            content: &request.system_prompt,
        });
        messages.extend(request.messages.iter().map(|m| ChatMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        ChatRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens.min(self.max_tokens),
        }
    }

    /// One HTTP round trip, classified into a reply or an [`LlmError`]
    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<CompletionResponse, LlmError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout)
                } else {
                    LlmError::Network(e)
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(secs),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ChatResponse = response.json().await?;
        Ok(reply.into_completion())
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %self.model, max_tokens = request.max_tokens, "OpenAIClient::complete: called");
        let body = self.chat_request(&request);

        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    attempt += 1;
                    let delay = e.retry_delay(attempt, BASE_BACKOFF);
                    warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "Transient LLM failure, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Full chat completions URL, tolerating a base URL that already ends in `/v1`
fn chat_endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{}/chat/completions", base)
    } else {
        format!("{}/v1/chat/completions", base)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl ChatResponse {
    /// First choice only; content is trimmed
    fn into_completion(self) -> CompletionResponse {
        let (content, stop_reason) = match self.choices.into_iter().next() {
            Some(choice) => (
                choice.message.content.map(|t| t.trim().to_string()),
                StopReason::from_openai(choice.finish_reason.as_deref()),
            ),
            None => (None, StopReason::EndTurn),
        };
        let usage = self
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        CompletionResponse {
            content,
            stop_reason,
            usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Message, Sampling};

    fn client(max_tokens: u32) -> OpenAIClient {
        OpenAIClient {
            model: "llama3.2:3b".to_string(),
            api_key: "local".to_string(),
            endpoint: chat_endpoint("http://localhost:11434"),
            http: Client::new(),
            max_tokens,
            timeout: Duration::from_secs(120),
        }
    }

    #[test]
    fn test_chat_request_puts_system_first() {
        let client = client(4096);
        let request = CompletionRequest::single_turn("Ask one question", "A meal planner", Sampling::new(0.6, 250));

        let body = serde_json::to_value(client.chat_request(&request)).unwrap();

        assert_eq!(body["model"], "llama3.2:3b");
        assert_eq!(body["max_tokens"], 250);
        assert!((body["temperature"].as_f64().unwrap() - 0.6).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Ask one question");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "A meal planner");
    }

    #[test]
    fn test_configured_cap_wins_over_stage_budget() {
        let client = client(1000);
        let request = CompletionRequest {
            system_prompt: "Extract".to_string(),
            messages: vec![Message::user("transcript")],
            temperature: 0.3,
            max_tokens: 1200,
        };
        assert_eq!(client.chat_request(&request).max_tokens, 1000);
    }

    #[test]
    fn test_chat_endpoint_variants() {
        assert_eq!(chat_endpoint("http://localhost:8080"), "http://localhost:8080/v1/chat/completions");
        assert_eq!(chat_endpoint("http://localhost:8080/"), "http://localhost:8080/v1/chat/completions");
        assert_eq!(chat_endpoint("http://localhost:8080/v1"), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_reply_is_trimmed_and_counted() {
        let reply: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"  [QUESTION 1] Who is it for? \n"},"finish_reason":"length"}],
                "usage":{"prompt_tokens":12,"completion_tokens":3}}"#,
        )
        .unwrap();

        let resp = reply.into_completion();
        assert_eq!(resp.content.as_deref(), Some("[QUESTION 1] Who is it for?"));
        assert_eq!(resp.stop_reason, StopReason::MaxTokens);
        assert_eq!(resp.usage.total(), 15);
    }

    #[test]
    fn test_reply_without_choices_has_no_content() {
        let reply: ChatResponse = serde_json::from_str(r#"{"usage":null}"#).unwrap();
        let resp = reply.into_completion();
        assert!(resp.content.is_none());
        assert_eq!(resp.usage, TokenUsage::default());
    }
}
