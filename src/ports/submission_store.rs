//! Submission store port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SubmissionId};
use crate::domain::intake::SubmissionRecord;

/// Persists finished reports.
///
/// No idempotency key is used; inserting the same record twice creates two
/// submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert a record and return its new id.
    async fn insert(&self, record: &SubmissionRecord) -> Result<SubmissionId, DomainError>;
}
