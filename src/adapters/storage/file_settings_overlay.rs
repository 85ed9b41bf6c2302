//! File-backed settings overlay.
//!
//! Stores the runtime overrides as a single pretty-printed JSON document.
//! A missing file means no overrides.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::SettingsOverlayStore;

#[derive(Debug, Clone)]
pub struct FileSettingsOverlay {
    path: PathBuf,
}

impl FileSettingsOverlay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, action: &str, err: impl std::fmt::Display) -> DomainError {
        DomainError::new(
            ErrorCode::StorageError,
            format!("Failed to {} {}: {}", action, self.path.display(), err),
        )
    }
}

#[async_trait]
impl SettingsOverlayStore for FileSettingsOverlay {
    async fn load_overrides(&self) -> Result<Option<Value>, DomainError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.storage_error("read", e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        let value: Value =
            serde_json::from_str(&content).map_err(|e| self.storage_error("parse", e))?;
        Ok(Some(value))
    }

    async fn save_overrides(&self, overrides: &Value) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.storage_error("create directory for", e))?;
        }

        let content =
            serde_json::to_vec_pretty(overrides).map_err(|e| self.storage_error("serialize", e))?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| self.storage_error("write", e))?;
        file.write_all(&content)
            .await
            .map_err(|e| self.storage_error("write", e))?;
        file.sync_all()
            .await
            .map_err(|e| self.storage_error("sync", e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.storage_error("replace", e))
    }

    async fn clear_overrides(&self) -> Result<(), DomainError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_error("remove", e)),
        }
    }
}
