//! PostgreSQL implementation of SubmissionStore.
//!
//! Finished reports land in the `submissions` table; media slots, detection
//! metadata and extracted extras are stored as JSONB.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode, SubmissionId};
use crate::domain::intake::SubmissionRecord;
use crate::ports::SubmissionStore;

#[derive(Clone)]
pub struct PostgresSubmissionStore {
    pool: PgPool,
}

impl PostgresSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_json<T: serde::Serialize>(value: &T, column: &str) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value).map_err(|e| {
        DomainError::new(
            ErrorCode::PersistenceFailed,
            format!("Failed to serialize {}: {}", column, e),
        )
    })
}

#[async_trait]
impl SubmissionStore for PostgresSubmissionStore {
    async fn insert(&self, record: &SubmissionRecord) -> Result<SubmissionId, DomainError> {
        let id = SubmissionId::new();

        sqlx::query(
            r#"
            INSERT INTO submissions (
                id, area_id, reporter_kind, reporter_key, description,
                location, location_detail, media, detection, extras,
                status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(id.as_uuid())
        .bind(record.area_id.as_str())
        .bind(record.reporter.kind())
        .bind(record.reporter.key())
        .bind(&record.description)
        .bind(&record.location)
        .bind(to_json(&record.location_detail, "location_detail")?)
        .bind(to_json(&record.media, "media")?)
        .bind(to_json(&record.detection, "detection")?)
        .bind(serde_json::Value::Object(record.extras.clone()))
        .bind(record.status.to_string())
        .bind(record.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::PersistenceFailed,
                format!("Failed to insert submission: {}", e),
            )
        })?;

        Ok(id)
    }
}
