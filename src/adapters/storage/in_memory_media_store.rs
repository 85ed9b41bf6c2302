//! In-Memory Media Store
//!
//! Holds uploaded evidence in memory and hands back `memory://` URLs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::MediaStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryMediaStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(url).cloned()
    }

    pub async fn count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn upload(
        &self,
        bytes: &[u8],
        folder: &str,
        file_name: &str,
    ) -> Result<String, DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(ErrorCode::MediaUploadFailed, "media store unavailable"));
        }

        let url = format!(
            "memory://{}/{}-{}",
            folder.trim_matches('/'),
            Uuid::new_v4().simple(),
            super::sanitize_file_name(file_name)
        );
        self.objects.write().await.insert(url.clone(), bytes.to_vec());
        Ok(url)
    }
}
