use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinic_application::{RecordRepository, SettingsRepository};
use clinic_core::{AppError, AppResult, ClinicId, UserId};
use clinic_domain::{ClinicRecord, RecordPayload, Resource};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed clinic record and settings repository.
#[derive(Clone)]
pub struct PostgresRecordRepository {
    pool: PgPool,
}

impl PostgresRecordRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RecordRow {
    id: Uuid,
    clinic_id: Uuid,
    resource: String,
    payload: Value,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for ClinicRecord {
    type Error = AppError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let resource = Resource::from_str(row.resource.as_str())?;
        let payload = RecordPayload::new(row.payload).map_err(|error| {
            AppError::Internal(format!("record '{}' has a corrupt payload: {error}", row.id))
        })?;

        Ok(ClinicRecord::from_storage(
            row.id,
            ClinicId::from_uuid(row.clinic_id),
            resource,
            payload,
            UserId::from_uuid(row.created_by),
            row.created_at,
            row.updated_at,
        ))
    }
}

#[async_trait]
impl RecordRepository for PostgresRecordRepository {
    async fn list_records(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
    ) -> AppResult<Vec<ClinicRecord>> {
        sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, clinic_id, resource, payload, created_by, created_at, updated_at
            FROM clinic_records
            WHERE clinic_id = $1 AND resource = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(clinic_id.as_uuid())
        .bind(resource.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list records: {error}")))?
        .into_iter()
        .map(ClinicRecord::try_from)
        .collect()
    }

    async fn find_record(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
        record_id: Uuid,
    ) -> AppResult<Option<ClinicRecord>> {
        sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, clinic_id, resource, payload, created_by, created_at, updated_at
            FROM clinic_records
            WHERE clinic_id = $1 AND resource = $2 AND id = $3
            "#,
        )
        .bind(clinic_id.as_uuid())
        .bind(resource.as_str())
        .bind(record_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find record: {error}")))?
        .map(ClinicRecord::try_from)
        .transpose()
    }

    async fn insert_record(&self, record: ClinicRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clinic_records (
                id,
                clinic_id,
                resource,
                payload,
                created_by,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.record_id())
        .bind(record.clinic_id().as_uuid())
        .bind(record.resource().as_str())
        .bind(record.payload().to_value())
        .bind(record.created_by().as_uuid())
        .bind(record.created_at())
        .bind(record.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert record: {error}")))?;

        Ok(())
    }

    async fn update_record(&self, record: ClinicRecord) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE clinic_records
            SET payload = $4, updated_at = $5
            WHERE clinic_id = $1 AND resource = $2 AND id = $3
            "#,
        )
        .bind(record.clinic_id().as_uuid())
        .bind(record.resource().as_str())
        .bind(record.record_id())
        .bind(record.payload().to_value())
        .bind(record.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update record: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "record '{}' was not found",
                record.record_id()
            )));
        }

        Ok(())
    }

    async fn delete_record(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
        record_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM clinic_records
            WHERE clinic_id = $1 AND resource = $2 AND id = $3
            "#,
        )
        .bind(clinic_id.as_uuid())
        .bind(resource.as_str())
        .bind(record_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete record: {error}")))?;

        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for PostgresRecordRepository {
    async fn load_settings(&self) -> AppResult<Value> {
        let document = sqlx::query_scalar::<_, Value>(
            "SELECT document FROM platform_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load settings: {error}")))?;

        Ok(document.unwrap_or_else(|| Value::Object(serde_json::Map::new())))
    }

    async fn save_settings(&self, settings: Value) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO platform_settings (id, document, updated_at)
            VALUES (1, $1, now())
            ON CONFLICT (id) DO UPDATE
            SET document = EXCLUDED.document, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(settings)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save settings: {error}")))?;

        Ok(())
    }
}
