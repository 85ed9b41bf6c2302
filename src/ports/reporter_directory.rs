//! Reporter directory port.
//!
//! Read-only lookups into the external student and staff registries.

use async_trait::async_trait;

use crate::domain::directory::{Staff, Student};
use crate::domain::foundation::DomainError;

/// Lookup of the people who may file reports.
///
/// A miss is `Ok(None)`; `Err` is reserved for infrastructure failures.
#[async_trait]
pub trait ReporterDirectory: Send + Sync {
    /// Find a student by enrollment code.
    async fn find_student_by_code(&self, code: &str) -> Result<Option<Student>, DomainError>;

    /// Find a staff member by national id number.
    async fn find_staff_by_national_id(&self, dni: &str) -> Result<Option<Staff>, DomainError>;
}
