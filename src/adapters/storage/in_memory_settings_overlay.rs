//! In-memory settings overlay (testing/development).

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::SettingsOverlayStore;

#[derive(Debug, Clone, Default)]
pub struct InMemorySettingsOverlay {
    overrides: Arc<RwLock<Option<Value>>>,
}

impl InMemorySettingsOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: Value) -> Self {
        Self {
            overrides: Arc::new(RwLock::new(Some(overrides))),
        }
    }
}

#[async_trait]
impl SettingsOverlayStore for InMemorySettingsOverlay {
    async fn load_overrides(&self) -> Result<Option<Value>, DomainError> {
        Ok(self.overrides.read().await.clone())
    }

    async fn save_overrides(&self, overrides: &Value) -> Result<(), DomainError> {
        *self.overrides.write().await = Some(overrides.clone());
        Ok(())
    }

    async fn clear_overrides(&self) -> Result<(), DomainError> {
        *self.overrides.write().await = None;
        Ok(())
    }
}
