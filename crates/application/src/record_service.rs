//! Clinic-scoped record access with role-based patient filtering.
//!
//! Every operation runs inside the principal's current clinic. Doctors and
//! nurses reading patient data are narrowed to their assigned patients;
//! records outside that scope behave as if they did not exist. Writes by a
//! narrowed caller must land inside the same scope.

use std::sync::Arc;

use chrono::Utc;
use clinic_core::{AppError, AppResult, ClinicId, Principal};
use clinic_domain::{
    ClinicRecord, DataFilter, PatientScope, RecordPayload, Resource, role_based_filter,
};
use serde_json::Value;
use uuid::Uuid;

use crate::RecordRepository;

/// How an update treats the stored payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordUpdateMode {
    /// Replace the whole payload.
    Replace,
    /// Merge top-level keys; `null` removes.
    Merge,
}

/// Application service for clinic records.
#[derive(Clone)]
pub struct RecordService {
    record_repository: Arc<dyn RecordRepository>,
}

impl RecordService {
    /// Creates a new record service.
    #[must_use]
    pub fn new(record_repository: Arc<dyn RecordRepository>) -> Self {
        Self { record_repository }
    }

    /// Lists the visible records of a collection.
    pub async fn list_records(
        &self,
        principal: &Principal,
        resource: Resource,
    ) -> AppResult<Vec<ClinicRecord>> {
        let clinic_id = principal.require_clinic()?;
        let scope = self.patient_scope(principal, clinic_id, resource).await?;

        let mut records = self
            .record_repository
            .list_records(clinic_id, resource)
            .await?;
        records.retain(|record| scope.admits(record));
        Ok(records)
    }

    /// Returns one visible record.
    pub async fn get_record(
        &self,
        principal: &Principal,
        resource: Resource,
        record_id: Uuid,
    ) -> AppResult<ClinicRecord> {
        let clinic_id = principal.require_clinic()?;
        self.find_visible(principal, clinic_id, resource, record_id)
            .await
    }

    /// Creates a record in the current clinic.
    ///
    /// A caller narrowed to assigned patients may only create records that
    /// refer to a patient already assigned to them.
    pub async fn create_record(
        &self,
        principal: &Principal,
        resource: Resource,
        payload: Value,
    ) -> AppResult<ClinicRecord> {
        let clinic_id = principal.require_clinic()?;
        let record = ClinicRecord::new(
            clinic_id,
            resource,
            RecordPayload::new(payload)?,
            principal.user_id(),
            Utc::now(),
        )?;

        let scope = self.patient_scope(principal, clinic_id, resource).await?;
        ensure_in_scope(&scope, &record)?;

        self.record_repository.insert_record(record.clone()).await?;
        Ok(record)
    }

    /// Updates a visible record's payload.
    pub async fn update_record(
        &self,
        principal: &Principal,
        resource: Resource,
        record_id: Uuid,
        payload: Value,
        mode: RecordUpdateMode,
    ) -> AppResult<ClinicRecord> {
        let clinic_id = principal.require_clinic()?;
        let payload = RecordPayload::new(payload)?;
        let current = self
            .find_visible(principal, clinic_id, resource, record_id)
            .await?;

        let updated = match mode {
            RecordUpdateMode::Replace => current.replaced(payload, Utc::now()),
            RecordUpdateMode::Merge => current.patched(payload, Utc::now()),
        };
        let scope = self.patient_scope(principal, clinic_id, resource).await?;
        ensure_in_scope(&scope, &updated)?;

        self.record_repository.update_record(updated.clone()).await?;
        Ok(updated)
    }

    /// Deletes a visible record.
    pub async fn delete_record(
        &self,
        principal: &Principal,
        resource: Resource,
        record_id: Uuid,
    ) -> AppResult<()> {
        let clinic_id = principal.require_clinic()?;
        self.find_visible(principal, clinic_id, resource, record_id)
            .await?;
        self.record_repository
            .delete_record(clinic_id, resource, record_id)
            .await
    }

    async fn find_visible(
        &self,
        principal: &Principal,
        clinic_id: ClinicId,
        resource: Resource,
        record_id: Uuid,
    ) -> AppResult<ClinicRecord> {
        let not_found = || {
            AppError::NotFound(format!(
                "{} record '{record_id}' was not found",
                resource.as_str()
            ))
        };

        let record = self
            .record_repository
            .find_record(clinic_id, resource, record_id)
            .await?
            .ok_or_else(not_found)?;

        let scope = self.patient_scope(principal, clinic_id, resource).await?;
        if !scope.admits(&record) {
            return Err(not_found());
        }

        Ok(record)
    }

    async fn patient_scope(
        &self,
        principal: &Principal,
        clinic_id: ClinicId,
        resource: Resource,
    ) -> AppResult<PatientScope> {
        let DataFilter::AssignedPatients { field, staff_id } =
            role_based_filter(principal, resource)
        else {
            return Ok(PatientScope::Unrestricted);
        };

        let mut assignments = Vec::new();
        for source in field.assignment_sources() {
            assignments.extend(
                self.record_repository
                    .list_records(clinic_id, *source)
                    .await?,
            );
        }

        Ok(PatientScope::from_assignments(field, staff_id, &assignments))
    }
}

fn ensure_in_scope(scope: &PatientScope, record: &ClinicRecord) -> AppResult<()> {
    if scope.admits(record) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "{} record must refer to a patient assigned to the caller",
        record.resource().as_str()
    )))
}
