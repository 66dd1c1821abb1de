use async_trait::async_trait;
use clinic_application::{RecordRepository, SettingsRepository};
use clinic_core::{AppError, AppResult, ClinicId};
use clinic_domain::{ClinicRecord, Resource};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::InMemoryStore;

#[async_trait]
impl RecordRepository for InMemoryStore {
    async fn list_records(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
    ) -> AppResult<Vec<ClinicRecord>> {
        let mut records: Vec<ClinicRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.clinic_id() == clinic_id && record.resource() == resource)
            .cloned()
            .collect();
        records.sort_by_key(|record| std::cmp::Reverse(record.created_at()));
        Ok(records)
    }

    async fn find_record(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
        record_id: Uuid,
    ) -> AppResult<Option<ClinicRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(&(clinic_id, record_id))
            .filter(|record| record.resource() == resource)
            .cloned())
    }

    async fn insert_record(&self, record: ClinicRecord) -> AppResult<()> {
        let key = (record.clinic_id(), record.record_id());
        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "record '{}' already exists",
                record.record_id()
            )));
        }

        records.insert(key, record);
        Ok(())
    }

    async fn update_record(&self, record: ClinicRecord) -> AppResult<()> {
        let key = (record.clinic_id(), record.record_id());
        let mut records = self.records.write().await;
        match records.get_mut(&key) {
            Some(stored) if stored.resource() == record.resource() => {
                *stored = record;
                Ok(())
            }
            _ => Err(AppError::NotFound(format!(
                "record '{}' was not found",
                record.record_id()
            ))),
        }
    }

    async fn delete_record(
        &self,
        clinic_id: ClinicId,
        resource: Resource,
        record_id: Uuid,
    ) -> AppResult<()> {
        let mut records = self.records.write().await;
        if records
            .get(&(clinic_id, record_id))
            .is_some_and(|record| record.resource() == resource)
        {
            records.remove(&(clinic_id, record_id));
        }
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for InMemoryStore {
    async fn load_settings(&self) -> AppResult<Value> {
        Ok(self
            .settings
            .read()
            .await
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    async fn save_settings(&self, settings: Value) -> AppResult<()> {
        *self.settings.write().await = Some(settings);
        Ok(())
    }
}
