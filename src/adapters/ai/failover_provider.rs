//! Failover AI Provider - Wrapper that provides automatic failover between providers.
//!
//! When the primary provider fails with a transient error (rate limit,
//! unavailable, network, timeout), the request is retried once on the
//! secondary provider.
//!
//! # Example
//!
//! ```ignore
//! let provider = FailoverAIProvider::new(Arc::new(openai))
//!     .with_fallback(Arc::new(anthropic));
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// AI provider wrapper with automatic failover support.
pub struct FailoverAIProvider {
    primary: Arc<dyn AIProvider>,
    fallback: Option<Arc<dyn AIProvider>>,
}

impl FailoverAIProvider {
    pub fn new(primary: Arc<dyn AIProvider>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn AIProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[async_trait]
impl AIProvider for FailoverAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let fallback = match &self.fallback {
            Some(fallback) => fallback,
            None => return self.primary.complete(request).await,
        };

        match self.primary.complete(request.clone()).await {
            Ok(response) => Ok(response),
            Err(err) if err.is_retryable() => {
                tracing::warn!(
                    primary = %self.primary.provider_info().name,
                    fallback = %fallback.provider_info().name,
                    purpose = %request.metadata.purpose,
                    error = %err,
                    "primary model provider failed, using fallback"
                );
                fallback.complete(request).await
            }
            Err(err) => Err(err),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.primary.provider_info()
    }
}
