use clinic_domain::Clinic;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for clinic creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-clinic-request.ts"
)]
pub struct CreateClinicRequest {
    pub name: String,
    pub code: String,
}

/// Incoming payload for clinic updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-clinic-request.ts"
)]
pub struct UpdateClinicRequest {
    pub name: String,
    pub is_active: bool,
}

/// API representation of a clinic.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/clinic-response.ts"
)]
pub struct ClinicResponse {
    pub clinic_id: String,
    pub name: String,
    pub code: String,
    pub is_active: bool,
}

impl From<Clinic> for ClinicResponse {
    fn from(value: Clinic) -> Self {
        Self {
            clinic_id: value.clinic_id().to_string(),
            name: value.name().as_str().to_owned(),
            code: value.code().as_str().to_owned(),
            is_active: value.is_active(),
        }
    }
}
