use clinic_core::Principal;
use clinic_domain::{Clinic, ClinicMembership};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/principal-response.ts"
)]
pub struct PrincipalResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub global_role: String,
}

impl From<&Principal> for PrincipalResponse {
    fn from(value: &Principal) -> Self {
        Self {
            user_id: value.user_id().to_string(),
            email: value.email().to_owned(),
            display_name: value.display_name().to_owned(),
            global_role: value.global_role().as_str().to_owned(),
        }
    }
}

/// A clinic the user belongs to.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-clinic-response.ts"
)]
pub struct SessionClinicResponse {
    pub clinic_id: String,
    pub name: String,
    pub code: String,
    pub role_name: String,
}

impl From<(Clinic, ClinicMembership)> for SessionClinicResponse {
    fn from((clinic, membership): (Clinic, ClinicMembership)) -> Self {
        Self {
            clinic_id: clinic.clinic_id().to_string(),
            name: clinic.name().as_str().to_owned(),
            code: clinic.code().as_str().to_owned(),
            role_name: membership.role_name().to_owned(),
        }
    }
}

/// Current principal, clinic context and effective permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub user: PrincipalResponse,
    pub clinic_id: Option<String>,
    pub clinics: Vec<SessionClinicResponse>,
    pub permissions: Vec<String>,
}

/// Clinic to store as the session's context.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/select-clinic-request.ts"
)]
pub struct SelectClinicRequest {
    pub clinic_id: String,
}
