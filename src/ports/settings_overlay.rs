//! Runtime settings overlay port.
//!
//! The overlay is a partial JSON document merged over the built-in intake
//! settings whenever a new session starts.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::DomainError;

#[async_trait]
pub trait SettingsOverlayStore: Send + Sync {
    /// Current overrides, or `None` when nothing has been saved.
    async fn load_overrides(&self) -> Result<Option<Value>, DomainError>;

    /// Replace the stored overrides.
    async fn save_overrides(&self, overrides: &Value) -> Result<(), DomainError>;

    /// Remove all overrides, falling back to built-in defaults.
    async fn clear_overrides(&self) -> Result<(), DomainError>;
}
