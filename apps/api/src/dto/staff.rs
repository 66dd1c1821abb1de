use clinic_application::StaffMember;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::PermissionGrantDto;

/// Incoming payload adding a user to the current clinic.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/add-staff-request.ts"
)]
pub struct AddStaffRequest {
    pub user_id: String,
    pub role_name: String,
    #[serde(default)]
    pub permission_overrides: Vec<PermissionGrantDto>,
}

/// Incoming payload changing a member's role or overrides.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-staff-request.ts"
)]
pub struct UpdateStaffRequest {
    pub role_name: String,
    #[serde(default)]
    pub permission_overrides: Vec<PermissionGrantDto>,
}

/// API representation of a clinic member.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/staff-member-response.ts"
)]
pub struct StaffMemberResponse {
    pub membership_id: String,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub role_name: String,
    pub permission_overrides: Vec<PermissionGrantDto>,
    pub is_active: bool,
    pub joined_at: String,
}

impl From<StaffMember> for StaffMemberResponse {
    fn from(value: StaffMember) -> Self {
        let StaffMember {
            membership,
            account,
        } = value;
        Self {
            membership_id: membership.membership_id().to_string(),
            user_id: membership.user_id().to_string(),
            email: account.email().as_str().to_owned(),
            display_name: account.display_name().as_str().to_owned(),
            role_name: membership.role_name().to_owned(),
            permission_overrides: membership
                .permission_overrides()
                .iter()
                .map(PermissionGrantDto::from)
                .collect(),
            is_active: membership.is_active(),
            joined_at: membership.joined_at().to_rfc3339(),
        }
    }
}
