//! Role-based row filtering for patient data.
//!
//! Doctors and nurses only see patients they are assigned to. The filter is a
//! pure function of the principal and the resource; the application layer
//! turns the marker into a concrete [`PatientScope`] by reading assignments.

use std::collections::HashSet;

use clinic_core::{GlobalRole, Principal, UserId};
use uuid::Uuid;

use crate::{ClinicRecord, Resource};

/// Payload field linking a record to a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentField {
    /// Treating doctor.
    DoctorId,
    /// Assigned nurse.
    NurseId,
}

impl AssignmentField {
    /// Returns the payload key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DoctorId => "doctor_id",
            Self::NurseId => "nurse_id",
        }
    }

    /// Returns the collections whose records carry this assignment.
    #[must_use]
    pub fn assignment_sources(&self) -> &'static [Resource] {
        match self {
            Self::DoctorId => &[Resource::Appointments, Resource::Prescriptions],
            Self::NurseId => &[Resource::Appointments],
        }
    }
}

/// Restriction applied when querying a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFilter {
    /// All records of the clinic are visible.
    Unrestricted,
    /// Only records of patients assigned to `staff_id` through `field`.
    AssignedPatients {
        /// Assignment field to match.
        field: AssignmentField,
        /// Staff member the patients must be assigned to.
        staff_id: UserId,
    },
}

/// Returns the data filter for `principal` reading `resource`.
#[must_use]
pub fn role_based_filter(principal: &Principal, resource: Resource) -> DataFilter {
    if !matches!(resource, Resource::Patients | Resource::Prescriptions) {
        return DataFilter::Unrestricted;
    }

    let field = match principal.global_role() {
        GlobalRole::Doctor => AssignmentField::DoctorId,
        GlobalRole::Nurse => AssignmentField::NurseId,
        _ => return DataFilter::Unrestricted,
    };

    DataFilter::AssignedPatients {
        field,
        staff_id: principal.user_id(),
    }
}

/// Concrete set of patients a caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientScope {
    /// No restriction.
    Unrestricted,
    /// Only these patient ids.
    Only(HashSet<Uuid>),
}

impl PatientScope {
    /// Collects patients assigned through `field` to `staff_id` from
    /// assignment-carrying records.
    #[must_use]
    pub fn from_assignments(
        field: AssignmentField,
        staff_id: UserId,
        assignments: &[ClinicRecord],
    ) -> Self {
        Self::Only(
            assignments
                .iter()
                .filter(|record| field.assignment_sources().contains(&record.resource()))
                .filter(|record| {
                    record.payload().uuid_field(field.as_str()) == Some(staff_id.as_uuid())
                })
                .filter_map(ClinicRecord::patient_reference)
                .collect(),
        )
    }

    /// Returns whether the record falls inside the scope.
    #[must_use]
    pub fn admits(&self, record: &ClinicRecord) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Only(patient_ids) => record
                .patient_reference()
                .is_some_and(|patient_id| patient_ids.contains(&patient_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use clinic_core::{ClinicId, GlobalRole, Principal, UserId};
    use serde_json::json;

    use super::{AssignmentField, DataFilter, PatientScope, role_based_filter};
    use crate::{ClinicRecord, RecordPayload, Resource};

    fn principal(role: GlobalRole) -> Principal {
        Principal::new(UserId::new(), "Test", "test@clinic.org", role)
    }

    fn record(clinic_id: ClinicId, resource: Resource, payload: serde_json::Value) -> ClinicRecord {
        ClinicRecord::new(
            clinic_id,
            resource,
            RecordPayload::new(payload).unwrap_or_else(|_| panic!("valid payload")),
            UserId::new(),
            Utc::now(),
        )
        .unwrap_or_else(|_| panic!("valid record"))
    }

    #[test]
    fn doctors_and_nurses_are_restricted_on_patient_data() {
        let doctor = principal(GlobalRole::Doctor);
        assert_eq!(
            role_based_filter(&doctor, Resource::Patients),
            DataFilter::AssignedPatients {
                field: AssignmentField::DoctorId,
                staff_id: doctor.user_id(),
            }
        );

        let nurse = principal(GlobalRole::Nurse);
        assert_eq!(
            role_based_filter(&nurse, Resource::Prescriptions),
            DataFilter::AssignedPatients {
                field: AssignmentField::NurseId,
                staff_id: nurse.user_id(),
            }
        );
    }

    #[test]
    fn other_roles_and_resources_are_unrestricted() {
        assert_eq!(
            role_based_filter(&principal(GlobalRole::Admin), Resource::Patients),
            DataFilter::Unrestricted
        );
        assert_eq!(
            role_based_filter(&principal(GlobalRole::Receptionist), Resource::Patients),
            DataFilter::Unrestricted
        );
        assert_eq!(
            role_based_filter(&principal(GlobalRole::Doctor), Resource::Invoices),
            DataFilter::Unrestricted
        );
    }

    #[test]
    fn scope_collects_assigned_patients_only() {
        let clinic_id = ClinicId::new();
        let doctor_id = UserId::new();
        let mine = record(clinic_id, Resource::Patients, json!({"name": "Ada"}));
        let theirs = record(clinic_id, Resource::Patients, json!({"name": "Bob"}));

        let assignments = vec![
            record(
                clinic_id,
                Resource::Appointments,
                json!({
                    "patient_id": mine.record_id().to_string(),
                    "doctor_id": doctor_id.to_string(),
                }),
            ),
            record(
                clinic_id,
                Resource::Appointments,
                json!({
                    "patient_id": theirs.record_id().to_string(),
                    "doctor_id": UserId::new().to_string(),
                }),
            ),
        ];

        let scope =
            PatientScope::from_assignments(AssignmentField::DoctorId, doctor_id, &assignments);
        assert!(scope.admits(&mine));
        assert!(!scope.admits(&theirs));
        assert!(PatientScope::Unrestricted.admits(&theirs));
    }

    #[test]
    fn nurse_assignments_ignore_prescriptions() {
        let clinic_id = ClinicId::new();
        let nurse_id = UserId::new();
        let patient = record(clinic_id, Resource::Patients, json!({}));
        let prescription = record(
            clinic_id,
            Resource::Prescriptions,
            json!({
                "patient_id": patient.record_id().to_string(),
                "nurse_id": nurse_id.to_string(),
            }),
        );

        let scope =
            PatientScope::from_assignments(AssignmentField::NurseId, nurse_id, &[prescription]);
        assert!(!scope.admits(&patient));
    }
}
