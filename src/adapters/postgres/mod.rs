//! PostgreSQL adapters - Database implementations for persistence ports.
//!
//! - `PostgresSubmissionStore` - Finished reports in the `submissions` table
//!
//! The schema lives in `migrations/` and is applied at startup.

mod submission_store;

pub use submission_store::PostgresSubmissionStore;
