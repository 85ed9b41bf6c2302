//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling real AI APIs.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Error injection for fallback testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response(r#"{"index": 1, "confidence": 90}"#)
//!     .with_error(MockError::Unavailable { message: "down".into() });
//!
//! let response = provider.complete(request).await?;
//! assert_eq!(provider.call_count(), 1);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Returned once the queue is empty; `None` means an `Unavailable` error.
    fallback: Option<String>,
    info: ProviderInfo,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success { content: String },
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// A mock whose empty queue answers with an `Unavailable` error.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            fallback: None,
            info: ProviderInfo::new("mock", "mock-model-1", 128_000).with_json_mode(true),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.queue().push_back(MockResponse::Success {
            content: content.into(),
        });
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.queue().push_back(MockResponse::Error(error));
        self
    }

    /// Answer returned whenever the queue is empty.
    pub fn with_default_response(mut self, content: impl Into<String>) -> Self {
        self.fallback = Some(content.into());
        self
    }

    /// Queues a response on a shared mock after construction.
    pub fn push_response(&self, content: impl Into<String>) {
        self.queue().push_back(MockResponse::Success {
            content: content.into(),
        });
    }

    pub fn call_count(&self) -> usize {
        self.recorded().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.recorded().clone()
    }

    /// Purposes of the recorded calls, in order.
    pub fn purposes(&self) -> Vec<String> {
        self.recorded()
            .iter()
            .map(|c| c.metadata.purpose.clone())
            .collect()
    }

    pub fn clear_calls(&self) {
        self.recorded().clear();
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<MockResponse>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<CompletionRequest>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_response(&self) -> MockResponse {
        self.queue().pop_front().unwrap_or_else(|| match &self.fallback {
            Some(content) => MockResponse::Success {
                content: content.clone(),
            },
            None => MockResponse::Error(MockError::Unavailable {
                message: "mock queue is empty".to_string(),
            }),
        })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let prompt_tokens: u32 = request
            .messages
            .iter()
            .map(|m| self.estimate_tokens(&m.content))
            .sum();
        self.recorded().push(request);

        match self.next_response() {
            MockResponse::Success { content } => Ok(CompletionResponse {
                usage: TokenUsage::new(prompt_tokens, self.estimate_tokens(&content)),
                content,
                model: self.info.model.clone(),
                finish_reason: FinishReason::Stop,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
