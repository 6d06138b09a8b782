//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// The pipeline never relies on server-side conversation state: every prompt
/// carries the full transcript it needs. A failed call surfaces as `Err` and is
/// never converted into an empty answer.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full reply
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(any(test, feature = "test-util"))]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tracing::debug;

    /// One scripted reply
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Text(String),
        Fail(String),
    }

    /// Scripted LLM client for tests
    ///
    /// Replies are served in order; every request is recorded so tests can assert
    /// on prompts, temperatures and token budgets.
    pub struct MockLlmClient {
        replies: Mutex<VecDeque<MockReply>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmClient {
        pub fn new<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
            let replies: VecDeque<MockReply> = texts.into_iter().map(|t| MockReply::Text(t.into())).collect();
            debug!(reply_count = %replies.len(), "MockLlmClient::new: called");
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_replies(replies: Vec<MockReply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request(&self, idx: usize) -> CompletionRequest {
            self.requests.lock().unwrap()[idx].clone()
        }

        /// Replies not yet served
        pub fn remaining(&self) -> usize {
            self.replies.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            self.requests.lock().unwrap().push(request);
            match self.replies.lock().unwrap().pop_front() {
                Some(MockReply::Text(text)) => Ok(CompletionResponse::text(text)),
                Some(MockReply::Fail(message)) => Err(LlmError::ApiError { status: 500, message }),
                None => {
                    debug!("MockLlmClient::complete: no more mock responses");
                    Err(LlmError::InvalidResponse("No more mock responses".to_string()))
                }
            }
        }
    }

}
