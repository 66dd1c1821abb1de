use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by administration use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a custom role is created.
    RoleCreated,
    /// Emitted when a role's grants are replaced.
    RolePermissionsReplaced,
    /// Emitted when a custom role is deleted.
    RoleDeleted,
    /// Emitted when a user joins or rejoins a clinic.
    MembershipAdded,
    /// Emitted when a membership's role or overrides change.
    MembershipUpdated,
    /// Emitted when a membership is deactivated.
    MembershipDeactivated,
    /// Emitted when a clinic is created.
    ClinicCreated,
    /// Emitted when a clinic profile changes.
    ClinicUpdated,
    /// Emitted when a user account is created.
    UserCreated,
    /// Emitted when a user account changes.
    UserUpdated,
    /// Emitted when platform settings are replaced.
    SettingsUpdated,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "role.created",
            Self::RolePermissionsReplaced => "role.permissions_replaced",
            Self::RoleDeleted => "role.deleted",
            Self::MembershipAdded => "membership.added",
            Self::MembershipUpdated => "membership.updated",
            Self::MembershipDeactivated => "membership.deactivated",
            Self::ClinicCreated => "clinic.created",
            Self::ClinicUpdated => "clinic.updated",
            Self::UserCreated => "user.created",
            Self::UserUpdated => "user.updated",
            Self::SettingsUpdated => "settings.updated",
        }
    }
}
