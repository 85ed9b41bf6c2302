//! Local Filesystem Media Store
//!
//! Writes evidence images under a base directory and returns `file://` URLs.
//!
//! # Directory Structure
//!
//! ```text
//! {base_path}/
//! └── reportes/
//!     ├── 3f2a...-foto.jpg
//!     └── 9c81...-captura.png
//! ```
//!
//! Files are written to a `.tmp` sibling, synced, then renamed into place so
//! a crash never leaves a truncated image behind a returned URL.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::MediaStore;

#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    base_path: PathBuf,
}

impl LocalMediaStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn folder_dir(&self, folder: &str) -> PathBuf {
        let folder = folder
            .split('/')
            .filter(|part| !part.is_empty() && *part != "." && *part != "..")
            .collect::<Vec<_>>()
            .join("/");
        self.base_path.join(folder)
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, path).await
    }
}

fn upload_error(path: &Path, err: std::io::Error) -> DomainError {
    DomainError::new(
        ErrorCode::MediaUploadFailed,
        format!("Failed to write {}: {}", path.display(), err),
    )
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(
        &self,
        bytes: &[u8],
        folder: &str,
        file_name: &str,
    ) -> Result<String, DomainError> {
        let dir = self.folder_dir(folder);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| upload_error(&dir, e))?;

        let stored_name = format!(
            "{}-{}",
            Uuid::new_v4().simple(),
            super::sanitize_file_name(file_name)
        );
        let path = dir.join(stored_name);
        self.write_atomic(&path, bytes)
            .await
            .map_err(|e| upload_error(&path, e))?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "stored media upload");
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_store() -> (LocalMediaStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        (LocalMediaStore::new(temp_dir.path()), temp_dir)
    }

    fn path_of(url: &str) -> PathBuf {
        PathBuf::from(url.trim_start_matches("file://"))
    }

    #[tokio::test]
    async fn upload_writes_file_under_folder() {
        let (store, temp_dir) = create_store();
        let url = store.upload(b"\x89PNG", "reportes", "captura.png").await.unwrap();

        let path = path_of(&url);
        assert!(path.starts_with(temp_dir.path().join("reportes")));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG");
        assert!(url.ends_with("-captura.png"));
    }

    #[tokio::test]
    async fn no_temp_file_is_left_behind() {
        let (store, temp_dir) = create_store();
        store.upload(b"data", "reportes", "foto.jpg").await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path().join("reportes"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn folder_cannot_escape_base_path() {
        let (store, temp_dir) = create_store();
        let url = store.upload(b"x", "../../etc", "foto.jpg").await.unwrap();
        assert!(path_of(&url).starts_with(temp_dir.path()));
    }

    #[tokio::test]
    async fn unwritable_base_is_an_upload_failure() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let store = LocalMediaStore::new(&blocker);
        let err = store.upload(b"x", "reportes", "foto.jpg").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MediaUploadFailed);
    }
}
