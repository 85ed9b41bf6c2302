//! Media store port for evidence attachments.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Stores uploaded images and hands back a URL to reference them.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under `folder` and return the public URL.
    ///
    /// `file_name` is a hint; implementations may rename to avoid clashes.
    async fn upload(
        &self,
        bytes: &[u8],
        folder: &str,
        file_name: &str,
    ) -> Result<String, DomainError>;
}
