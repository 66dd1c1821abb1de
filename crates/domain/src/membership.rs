use chrono::{DateTime, Utc};
use clinic_core::{AppResult, ClinicId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{PermissionGrant, validate_role_name};

/// Link between a user and a clinic carrying the user's role there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicMembership {
    membership_id: Uuid,
    user_id: UserId,
    clinic_id: ClinicId,
    role_name: String,
    permission_overrides: Vec<PermissionGrant>,
    is_active: bool,
    joined_at: DateTime<Utc>,
}

impl ClinicMembership {
    /// Creates an active membership.
    pub fn new(
        user_id: UserId,
        clinic_id: ClinicId,
        role_name: impl Into<String>,
        permission_overrides: Vec<PermissionGrant>,
        joined_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let role_name = role_name.into();
        validate_role_name(role_name.as_str())?;

        Ok(Self {
            membership_id: Uuid::new_v4(),
            user_id,
            clinic_id,
            role_name,
            permission_overrides,
            is_active: true,
            joined_at,
        })
    }

    /// Rebuilds a membership loaded from storage.
    #[must_use]
    pub fn from_storage(
        membership_id: Uuid,
        user_id: UserId,
        clinic_id: ClinicId,
        role_name: String,
        permission_overrides: Vec<PermissionGrant>,
        is_active: bool,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            membership_id,
            user_id,
            clinic_id,
            role_name,
            permission_overrides,
            is_active,
            joined_at,
        }
    }

    /// Soft-deletes the membership.
    #[must_use]
    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Reactivates the membership for a re-invite, replacing role and overrides.
    pub fn reactivated(
        mut self,
        role_name: impl Into<String>,
        permission_overrides: Vec<PermissionGrant>,
        joined_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let role_name = role_name.into();
        validate_role_name(role_name.as_str())?;

        self.role_name = role_name;
        self.permission_overrides = permission_overrides;
        self.is_active = true;
        self.joined_at = joined_at;
        Ok(self)
    }

    /// Changes role and overrides on an active membership.
    pub fn with_role(
        mut self,
        role_name: impl Into<String>,
        permission_overrides: Vec<PermissionGrant>,
    ) -> AppResult<Self> {
        let role_name = role_name.into();
        validate_role_name(role_name.as_str())?;

        self.role_name = role_name;
        self.permission_overrides = permission_overrides;
        Ok(self)
    }

    /// Returns the membership identifier.
    #[must_use]
    pub fn membership_id(&self) -> Uuid {
        self.membership_id
    }

    /// Returns the member.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the clinic.
    #[must_use]
    pub fn clinic_id(&self) -> ClinicId {
        self.clinic_id
    }

    /// Returns the role held in the clinic.
    #[must_use]
    pub fn role_name(&self) -> &str {
        self.role_name.as_str()
    }

    /// Returns explicit overrides applied after role resolution.
    #[must_use]
    pub fn permission_overrides(&self) -> &[PermissionGrant] {
        &self.permission_overrides
    }

    /// Returns whether the membership is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns when the user (re)joined the clinic.
    #[must_use]
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}
