//! LlmClient trait definition

use async_trait::async_trait;
#[allow(unused_imports)]
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// This is the single capability the estimation core requires from a
/// language-model backend: an ordered list of role-tagged messages in, text
/// out. No conversation state lives behind this trait; the session owns the
/// transcript and replays it on every call.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing::debug;

    use super::*;

    /// Mock LLM client for tests - replays a scripted list of responses
    pub struct MockLlmClient {
        responses: Vec<Result<CompletionResponse, String>>,
        call_count: AtomicUsize,
    }

    impl MockLlmClient {
        /// Script a sequence of successful text responses
        pub fn with_texts(texts: Vec<&str>) -> Self {
            debug!(response_count = %texts.len(), "MockLlmClient::with_texts: called");
            Self {
                responses: texts.into_iter().map(|t| Ok(CompletionResponse::from_text(t))).collect(),
                call_count: AtomicUsize::new(0),
            }
        }

        /// Script raw results, Err(msg) becoming an InvalidResponse error
        pub fn new(responses: Vec<Result<CompletionResponse, String>>) -> Self {
            debug!(response_count = %responses.len(), "MockLlmClient::new: called");
            Self {
                responses,
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            debug!("MockLlmClient::call_count: called");
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            debug!(%idx, "MockLlmClient::complete: fetching response");
            match self.responses.get(idx) {
                Some(Ok(response)) => Ok(response.clone()),
                Some(Err(msg)) => Err(LlmError::InvalidResponse(msg.clone())),
                None => {
                    debug!("MockLlmClient::complete: no more mock responses");
                    Err(LlmError::InvalidResponse("No more mock responses".to_string()))
                }
            }
        }
    }
}
