use clinic_application::{GrantInput, RoleView};
use clinic_domain::PermissionGrant;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One permission grant or revocation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-grant-dto.ts"
)]
pub struct PermissionGrantDto {
    pub permission: String,
    pub granted: bool,
}

impl From<&PermissionGrant> for PermissionGrantDto {
    fn from(value: &PermissionGrant) -> Self {
        Self {
            permission: value.permission.name(),
            granted: value.granted,
        }
    }
}

impl From<PermissionGrantDto> for GrantInput {
    fn from(value: PermissionGrantDto) -> Self {
        Self {
            permission: value.permission,
            granted: value.granted,
        }
    }
}

/// Incoming payload for custom role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    #[ts(optional)]
    pub display_name: Option<String>,
    pub permissions: Vec<String>,
    #[serde(default)]
    #[ts(optional)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub base_roles: Vec<String>,
}

/// Replacement permission list for a role.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-permissions-request.ts"
)]
pub struct UpdateRolePermissionsRequest {
    pub permissions: Vec<String>,
}

/// API representation of a role and what it resolves to.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub name: String,
    pub display_name: String,
    pub priority: i32,
    pub is_system: bool,
    pub is_active: bool,
    pub base_roles: Vec<String>,
    pub grants: Vec<PermissionGrantDto>,
    pub effective_permissions: Vec<String>,
}

impl From<RoleView> for RoleResponse {
    fn from(value: RoleView) -> Self {
        let role = value.role;
        Self {
            name: role.name().to_owned(),
            display_name: role.display_name().to_owned(),
            priority: role.priority(),
            is_system: role.is_system(),
            is_active: role.is_active(),
            base_roles: role.base_roles().to_vec(),
            grants: role.grants().iter().map(PermissionGrantDto::from).collect(),
            effective_permissions: value
                .effective_permissions
                .iter()
                .map(|permission| permission.name())
                .collect(),
        }
    }
}
