use async_trait::async_trait;
use clinic_core::{AppResult, ClinicId};
use clinic_domain::{ClinicRecord, Resource};
use serde_json::Value;
use uuid::Uuid;

/// Repository port for clinic-scoped business records.
///
/// Every query is keyed by clinic; adapters never return records of another
/// clinic.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Lists records of one collection in a clinic, newest first.
    async fn list_records(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
    ) -> AppResult<Vec<ClinicRecord>>;

    /// Finds one record of a collection in a clinic.
    async fn find_record(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
        record_id: Uuid,
    ) -> AppResult<Option<ClinicRecord>>;

    /// Inserts a new record.
    async fn insert_record(&self, record: ClinicRecord) -> AppResult<()>;

    /// Replaces the payload and update time of an existing record.
    async fn update_record(&self, record: ClinicRecord) -> AppResult<()>;

    /// Deletes a record.
    async fn delete_record(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
        record_id: Uuid,
    ) -> AppResult<()>;
}

/// Repository port for the global settings document.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Loads the settings object; an empty object when never saved.
    async fn load_settings(&self) -> AppResult<Value>;

    /// Replaces the settings object.
    async fn save_settings(&self, settings: Value) -> AppResult<()>;
}
