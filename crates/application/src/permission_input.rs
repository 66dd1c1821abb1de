use std::str::FromStr;

use clinic_core::{AppError, AppResult};
use clinic_domain::{Permission, PermissionGrant};

/// Transport form of a single grant or revocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantInput {
    /// Permission name such as `patients.view`.
    pub permission: String,
    /// `false` revokes.
    pub granted: bool,
}

/// Parses permission names, rejecting the whole list on the first unknown name.
pub fn parse_permission_names(names: &[String]) -> AppResult<Vec<Permission>> {
    names
        .iter()
        .map(|name| {
            Permission::from_str(name.trim())
                .map_err(|_| AppError::Validation(format!("unknown permission '{name}'")))
        })
        .collect()
}

/// Parses transport grants into domain grants.
pub fn parse_grants(grants: &[GrantInput]) -> AppResult<Vec<PermissionGrant>> {
    grants
        .iter()
        .map(|grant| {
            Permission::from_str(grant.permission.trim())
                .map(|permission| PermissionGrant {
                    permission,
                    granted: grant.granted,
                })
                .map_err(|_| {
                    AppError::Validation(format!("unknown permission '{}'", grant.permission))
                })
        })
        .collect()
}
