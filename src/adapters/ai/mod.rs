//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `OpenAIProvider` - OpenAI Chat Completions (JSON mode)
//! - `AnthropicProvider` - Anthropic Messages API
//! - `FailoverAIProvider` - Wrapper with automatic failover between providers

mod anthropic_provider;
mod failover_provider;
mod http_support;
mod mock_provider;
mod openai_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use failover_provider::FailoverAIProvider;
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
