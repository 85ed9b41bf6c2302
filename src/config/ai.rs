//! Language-model configuration
//!
//! The model is optional. With `enabled = false` (the default) the intake
//! runs in manual mode and never calls out.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Turns the assisted path on
    #[serde(default)]
    pub enabled: bool,

    /// OpenAI API key
    pub openai_api_key: Option<Secret<String>>,

    /// Anthropic API key
    pub anthropic_api_key: Option<Secret<String>>,

    /// Primary AI provider
    #[serde(default)]
    pub primary_provider: AiProvider,

    /// Fallback AI provider, used on transient failures
    pub fallback_provider: Option<AiProvider>,

    /// Model override for OpenAI
    pub openai_model: Option<String>,

    /// Model override for Anthropic
    pub anthropic_model: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAI,
    #[default]
    Anthropic,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn has_openai(&self) -> bool {
        has_key(&self.openai_api_key)
    }

    pub fn has_anthropic(&self) -> bool {
        has_key(&self.anthropic_api_key)
    }

    pub fn has_key_for(&self, provider: AiProvider) -> bool {
        match provider {
            AiProvider::OpenAI => self.has_openai(),
            AiProvider::Anthropic => self.has_anthropic(),
        }
    }

    /// True when the model should actually be wired in.
    pub fn is_active(&self) -> bool {
        self.enabled && self.has_key_for(self.primary_provider)
    }

    /// The fallback provider, if configured with a key and distinct from
    /// the primary.
    pub fn active_fallback(&self) -> Option<AiProvider> {
        self.fallback_provider
            .filter(|p| *p != self.primary_provider && self.has_key_for(*p))
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if !self.has_openai() && !self.has_anthropic() {
            return Err(ValidationError::NoAiProviderConfigured);
        }

        match self.primary_provider {
            AiProvider::OpenAI if !self.has_openai() => {
                return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
            }
            AiProvider::Anthropic if !self.has_anthropic() => {
                return Err(ValidationError::MissingRequired("ANTHROPIC_API_KEY"));
            }
            _ => {}
        }

        Ok(())
    }
}

fn has_key(key: &Option<Secret<String>>) -> bool {
    key.as_ref()
        .is_some_and(|k| !k.expose_secret().trim().is_empty())
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            openai_api_key: None,
            anthropic_api_key: None,
            primary_provider: AiProvider::default(),
            fallback_provider: None,
            openai_model: None,
            anthropic_model: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(value: &str) -> Option<Secret<String>> {
        Some(Secret::new(value.to_string()))
    }

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.primary_provider, AiProvider::Anthropic);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_disabled_config_is_valid_without_keys() {
        let config = AiConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.is_active());
    }

    #[test]
    fn test_enabled_without_keys_fails() {
        let config = AiConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::NoAiProviderConfigured)
        ));
    }

    #[test]
    fn test_blank_key_does_not_count() {
        let config = AiConfig {
            enabled: true,
            anthropic_api_key: key("  "),
            ..Default::default()
        };
        assert!(!config.has_anthropic());
        assert!(!config.is_active());
    }

    #[test]
    fn test_primary_missing_key() {
        let config = AiConfig {
            enabled: true,
            primary_provider: AiProvider::Anthropic,
            openai_api_key: key("sk-xxx"),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("ANTHROPIC_API_KEY"))
        ));
    }

    #[test]
    fn test_active_with_fallback() {
        let config = AiConfig {
            enabled: true,
            primary_provider: AiProvider::Anthropic,
            anthropic_api_key: key("sk-ant-xxx"),
            fallback_provider: Some(AiProvider::OpenAI),
            openai_api_key: key("sk-xxx"),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.is_active());
        assert_eq!(config.active_fallback(), Some(AiProvider::OpenAI));
    }

    #[test]
    fn test_fallback_without_key_is_ignored() {
        let config = AiConfig {
            enabled: true,
            anthropic_api_key: key("sk-ant-xxx"),
            fallback_provider: Some(AiProvider::OpenAI),
            ..Default::default()
        };
        assert_eq!(config.active_fallback(), None);
    }
}
