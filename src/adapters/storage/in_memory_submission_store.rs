//! In-Memory Submission Store
//!
//! Keeps finished reports in memory. Used by tests and the development
//! profile; supports failure injection to exercise the persistence error path.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SubmissionId};
use crate::domain::intake::SubmissionRecord;
use crate::ports::SubmissionStore;

#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionStore {
    records: Arc<RwLock<Vec<(SubmissionId, SubmissionRecord)>>>,
    failing: Arc<AtomicBool>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All stored records in insertion order.
    pub async fn records(&self) -> Vec<(SubmissionId, SubmissionRecord)> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, id: SubmissionId) -> Option<SubmissionRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|(stored, _)| *stored == id)
            .map(|(_, record)| record.clone())
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn insert(&self, record: &SubmissionRecord) -> Result<SubmissionId, DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::PersistenceFailed,
                "submission store unavailable",
            ));
        }

        let id = SubmissionId::new();
        self.records.write().await.push((id, record.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Area, Location};
    use crate::domain::directory::{Reporter, Student};
    use crate::domain::foundation::AreaId;
    use crate::domain::intake::{Extras, ReadyReport};

    fn record() -> SubmissionRecord {
        let report = ReadyReport {
            reporter: Reporter::Student(Student {
                code: "U20201234".into(),
                dni: "72345678".into(),
                name: "Ana Torres".into(),
            }),
            area: Area {
                id: AreaId::new("sistemas").unwrap(),
                name: "Sistemas".into(),
                description: String::new(),
                fields: vec![],
            },
            description: "El proyector no enciende".into(),
            location: Location::freeform("Aula 201"),
            media: vec![],
            detection: None,
            extras: Extras::new(),
        };
        SubmissionRecord::assemble(&report).unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let store = InMemorySubmissionStore::new();
        let first = store.insert(&record()).await.unwrap();
        let second = store.insert(&record()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.count().await, 2);
        assert_eq!(store.get(first).await.unwrap().description, "El proyector no enciende");
    }

    #[tokio::test]
    async fn failure_injection_rejects_inserts() {
        let store = InMemorySubmissionStore::new();
        store.set_failing(true);

        let err = store.insert(&record()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PersistenceFailed);
        assert_eq!(store.count().await, 0);

        store.set_failing(false);
        assert!(store.insert(&record()).await.is_ok());
    }

    #[tokio::test]
    async fn clones_share_records() {
        let store = InMemorySubmissionStore::new();
        let handle = store.clone();
        store.insert(&record()).await.unwrap();
        assert_eq!(handle.records().await.len(), 1);
        handle.clear().await;
        assert_eq!(store.count().await, 0);
    }
}
