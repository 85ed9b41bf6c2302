//! Reporter identification from a typed number.

use std::sync::Arc;

use crate::domain::directory::Reporter;
use crate::domain::intake::policy::parse_identity;
use crate::domain::intake::IdentityInput;
use crate::ports::ReporterDirectory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResolution {
    Found(Reporter),
    /// Numeric input that matched nobody; carries the digits.
    NotFound(String),
    /// Anything that is not purely numeric.
    NotIdentityLike,
}

/// Eight digits try staff (national id) first, then a student code of the
/// same length. Any other digit string is a student code.
pub struct IdentityResolver {
    directory: Arc<dyn ReporterDirectory>,
}

impl IdentityResolver {
    pub fn new(directory: Arc<dyn ReporterDirectory>) -> Self {
        Self { directory }
    }

    pub async fn resolve(&self, raw: &str) -> IdentityResolution {
        let (digits, found) = match parse_identity(raw) {
            IdentityInput::NotIdentityLike => return IdentityResolution::NotIdentityLike,
            IdentityInput::EightDigits(digits) => {
                let mut found = self.find_staff(&digits).await;
                if found.is_none() {
                    found = self.find_student(&digits).await;
                }
                (digits, found)
            }
            IdentityInput::StudentCode(code) => {
                let found = self.find_student(&code).await;
                (code, found)
            }
        };

        match found {
            Some(reporter) => {
                tracing::info!(kind = reporter.to_ref().kind(), "reporter identified");
                IdentityResolution::Found(reporter)
            }
            None => {
                tracing::debug!(input_len = digits.len(), "no reporter matched");
                IdentityResolution::NotFound(digits)
            }
        }
    }

    async fn find_staff(&self, dni: &str) -> Option<Reporter> {
        match self.directory.find_staff_by_national_id(dni).await {
            Ok(staff) => staff.map(Reporter::Staff),
            Err(err) => {
                tracing::warn!(error = %err, "staff lookup failed, treating as not found");
                None
            }
        }
    }

    async fn find_student(&self, code: &str) -> Option<Reporter> {
        match self.directory.find_student_by_code(code).await {
            Ok(student) => student.map(Reporter::Student),
            Err(err) => {
                tracing::warn!(error = %err, "student lookup failed, treating as not found");
                None
            }
        }
    }
}
