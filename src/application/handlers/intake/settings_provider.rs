//! Per-session settings snapshots.
//!
//! Built-in settings come from configuration; the runtime overlay is read
//! and merged each time a session starts, so edits only affect sessions
//! started afterwards.

use serde_json::Value;
use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::intake::IntakeSettings;
use crate::ports::SettingsOverlayStore;

#[derive(Clone)]
pub struct SettingsProvider {
    base: Arc<IntakeSettings>,
    overlay: Option<Arc<dyn SettingsOverlayStore>>,
}

impl SettingsProvider {
    /// Settings without a runtime overlay.
    pub fn fixed(base: IntakeSettings) -> Self {
        Self {
            base: Arc::new(base),
            overlay: None,
        }
    }

    pub fn with_overlay(base: IntakeSettings, overlay: Arc<dyn SettingsOverlayStore>) -> Self {
        Self {
            base: Arc::new(base),
            overlay: Some(overlay),
        }
    }

    pub fn base(&self) -> &IntakeSettings {
        &self.base
    }

    /// The effective settings for a new session.
    ///
    /// An unreadable or invalid overlay is logged and ignored.
    pub async fn snapshot(&self) -> Arc<IntakeSettings> {
        let overlay = match &self.overlay {
            Some(overlay) => overlay,
            None => return self.base.clone(),
        };

        match overlay.load_overrides().await {
            Ok(Some(overrides)) => match self.base.with_overrides(&overrides) {
                Ok(merged) => Arc::new(merged),
                Err(err) => {
                    tracing::warn!(error = %err, "stored settings overrides are invalid, using defaults");
                    self.base.clone()
                }
            },
            Ok(None) => self.base.clone(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load settings overrides, using defaults");
                self.base.clone()
            }
        }
    }

    /// Raw stored overrides, if any.
    pub async fn overrides(&self) -> Result<Option<Value>, DomainError> {
        match &self.overlay {
            Some(overlay) => overlay.load_overrides().await,
            None => Ok(None),
        }
    }

    /// Validates `overrides` against the built-in settings, then stores them.
    /// Returns the merged result.
    pub async fn save_overrides(&self, overrides: &Value) -> Result<IntakeSettings, DomainError> {
        let merged = self.base.with_overrides(overrides)?;
        let overlay = self.overlay.as_ref().ok_or_else(no_overlay)?;
        overlay.save_overrides(overrides).await?;
        tracing::info!("settings overrides saved");
        Ok(merged)
    }

    pub async fn clear_overrides(&self) -> Result<(), DomainError> {
        let overlay = self.overlay.as_ref().ok_or_else(no_overlay)?;
        overlay.clear_overrides().await?;
        tracing::info!("settings overrides cleared");
        Ok(())
    }
}

fn no_overlay() -> DomainError {
    DomainError::new(
        crate::domain::foundation::ErrorCode::StorageError,
        "no settings overlay store is configured",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySettingsOverlay;
    use crate::domain::foundation::ErrorCode;
    use serde_json::json;

    fn provider() -> (SettingsProvider, InMemorySettingsOverlay) {
        let overlay = InMemorySettingsOverlay::new();
        (
            SettingsProvider::with_overlay(IntakeSettings::default(), Arc::new(overlay.clone())),
            overlay,
        )
    }

    #[tokio::test]
    async fn snapshot_without_overrides_is_the_base() {
        let (provider, _) = provider();
        assert_eq!(*provider.snapshot().await, IntakeSettings::default());
    }

    #[tokio::test]
    async fn saved_overrides_apply_to_later_snapshots_only() {
        let (provider, _) = provider();
        let before = provider.snapshot().await;

        provider
            .save_overrides(&json!({"messages": {"welcome": "Bienvenido"}}))
            .await
            .unwrap();
        let after = provider.snapshot().await;

        assert_ne!(before.messages.welcome, "Bienvenido");
        assert_eq!(after.messages.welcome, "Bienvenido");
        assert_eq!(after.thresholds, before.thresholds);
    }

    #[tokio::test]
    async fn invalid_overrides_are_rejected_before_saving() {
        let (provider, overlay) = provider();
        let err = provider
            .save_overrides(&json!({"thresholds": {"confidence_threshold": 150}}))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(overlay.load_overrides().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_stored_overrides_fall_back_to_base() {
        let overlay = InMemorySettingsOverlay::with_overrides(json!({"max_media_bytes": "mucho"}));
        let provider = SettingsProvider::with_overlay(IntakeSettings::default(), Arc::new(overlay));
        assert_eq!(*provider.snapshot().await, IntakeSettings::default());
    }

    #[tokio::test]
    async fn clear_restores_defaults() {
        let (provider, _) = provider();
        provider
            .save_overrides(&json!({"retry": {"max_attempts": 2}}))
            .await
            .unwrap();
        provider.clear_overrides().await.unwrap();
        assert!(provider.snapshot().await.retry.max_attempts.is_none());
    }

    #[tokio::test]
    async fn fixed_provider_cannot_save() {
        let provider = SettingsProvider::fixed(IntakeSettings::default());
        assert!(provider.save_overrides(&json!({})).await.is_err());
        assert!(provider.overrides().await.unwrap().is_none());
    }
}
