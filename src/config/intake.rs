//! Intake dialogue configuration
//!
//! Business knobs only. Message and prompt texts come from the built-in
//! catalogs and the runtime overlay.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::intake::{IntakeSettings, RetryPolicy, Thresholds};

#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    #[serde(default = "default_min_description_len")]
    pub min_description_len: usize,

    #[serde(default = "default_min_location_len")]
    pub min_location_len: usize,

    /// Classifier acceptance threshold, 0..=100
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u8,

    /// Consecutive invalid replies tolerated per step; unset means unbounded
    pub max_attempts: Option<u32>,

    #[serde(default = "default_max_media_bytes")]
    pub max_media_bytes: usize,

    /// Storage folder prefix for uploaded images
    #[serde(default = "default_media_folder")]
    pub media_folder: String,

    /// Seconds without a turn before a conversation is dropped
    #[serde(default = "default_conversation_idle_secs")]
    pub conversation_idle_secs: u64,

    /// Live conversations held at once
    #[serde(default = "default_max_conversations")]
    pub max_conversations: usize,
}

impl IntakeConfig {
    /// Base settings for every session, before the overlay.
    pub fn to_settings(&self) -> IntakeSettings {
        IntakeSettings {
            thresholds: Thresholds {
                min_description_len: self.min_description_len,
                min_location_len: self.min_location_len,
                confidence_threshold: self.confidence_threshold,
            },
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
            },
            max_media_bytes: self.max_media_bytes,
            media_folder: self.media_folder.clone(),
            ..IntakeSettings::default()
        }
    }

    pub fn conversation_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.conversation_idle_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.conversation_idle_secs == 0 {
            return Err(ValidationError::InvalidIntakeSetting(
                "conversation_idle_secs must be positive".to_string(),
            ));
        }
        if self.max_conversations == 0 {
            return Err(ValidationError::InvalidIntakeSetting(
                "max_conversations must be positive".to_string(),
            ));
        }
        self.to_settings()
            .validate()
            .map_err(|e| ValidationError::InvalidIntakeSetting(e.to_string()))
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            min_description_len: default_min_description_len(),
            min_location_len: default_min_location_len(),
            confidence_threshold: default_confidence_threshold(),
            max_attempts: None,
            max_media_bytes: default_max_media_bytes(),
            media_folder: default_media_folder(),
            conversation_idle_secs: default_conversation_idle_secs(),
            max_conversations: default_max_conversations(),
        }
    }
}

fn default_min_description_len() -> usize {
    10
}

fn default_min_location_len() -> usize {
    3
}

fn default_confidence_threshold() -> u8 {
    70
}

fn default_max_media_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_media_folder() -> String {
    "reportes".to_string()
}

fn default_conversation_idle_secs() -> u64 {
    30 * 60
}

fn default_max_conversations() -> usize {
    10_000
}
