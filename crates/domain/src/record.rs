use chrono::{DateTime, Utc};
use clinic_core::{AppError, AppResult, ClinicId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::Resource;

/// Key reserved for the server-owned clinic reference.
pub const CLINIC_REFERENCE_KEY: &str = "clinic_id";

/// JSON object body of a clinic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload(Map<String, Value>);

impl RecordPayload {
    /// Validates a client-supplied payload.
    ///
    /// The payload must be a JSON object and may not carry a clinic reference.
    pub fn new(value: Value) -> AppResult<Self> {
        let Value::Object(fields) = value else {
            return Err(AppError::Validation(
                "record payload must be a JSON object".to_owned(),
            ));
        };

        if fields.contains_key(CLINIC_REFERENCE_KEY) {
            return Err(AppError::Validation(format!(
                "record payload must not contain '{CLINIC_REFERENCE_KEY}'"
            )));
        }

        Ok(Self(fields))
    }

    /// Returns a UUID-valued field, ignoring missing or malformed values.
    #[must_use]
    pub fn uuid_field(&self, field: &str) -> Option<Uuid> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .and_then(|value| Uuid::parse_str(value).ok())
    }

    /// Returns the payload as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    fn merge(&mut self, patch: Self) {
        for (key, value) in patch.0 {
            if value.is_null() {
                self.0.remove(&key);
            } else {
                self.0.insert(key, value);
            }
        }
    }
}

/// Clinic-scoped business document such as a patient or an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicRecord {
    record_id: Uuid,
    clinic_id: ClinicId,
    resource: Resource,
    payload: RecordPayload,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClinicRecord {
    /// Creates a record owned by `clinic_id`.
    pub fn new(
        clinic_id: ClinicId,
        resource: Resource,
        payload: RecordPayload,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        if !resource.is_record_collection() {
            return Err(AppError::Validation(format!(
                "resource '{}' is not a record collection",
                resource.as_str()
            )));
        }

        Ok(Self {
            record_id: Uuid::new_v4(),
            clinic_id,
            resource,
            payload,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a record loaded from storage.
    #[must_use]
    pub fn from_storage(
        record_id: Uuid,
        clinic_id: ClinicId,
        resource: Resource,
        payload: RecordPayload,
        created_by: UserId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id,
            clinic_id,
            resource,
            payload,
            created_by,
            created_at,
            updated_at,
        }
    }

    /// Replaces the payload. Identity and clinic reference never change.
    #[must_use]
    pub fn replaced(mut self, payload: RecordPayload, now: DateTime<Utc>) -> Self {
        self.payload = payload;
        self.updated_at = now;
        self
    }

    /// Merges top-level keys into the payload; `null` removes a key.
    #[must_use]
    pub fn patched(mut self, patch: RecordPayload, now: DateTime<Utc>) -> Self {
        self.payload.merge(patch);
        self.updated_at = now;
        self
    }

    /// Returns the patient this record belongs to.
    ///
    /// Patient records are their own patient; other records reference one
    /// through `patient_id`.
    #[must_use]
    pub fn patient_reference(&self) -> Option<Uuid> {
        match self.resource {
            Resource::Patients => Some(self.record_id),
            _ => self.payload.uuid_field("patient_id"),
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn record_id(&self) -> Uuid {
        self.record_id
    }

    /// Returns the owning clinic.
    #[must_use]
    pub fn clinic_id(&self) -> ClinicId {
        self.clinic_id
    }

    /// Returns the record collection.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Returns the payload.
    #[must_use]
    pub fn payload(&self) -> &RecordPayload {
        &self.payload
    }

    /// Returns the creator.
    #[must_use]
    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update time.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
