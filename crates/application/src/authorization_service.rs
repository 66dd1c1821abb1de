//! Permission evaluator.
//!
//! Decides whether a principal holds a permission in a clinic by resolving
//! the role of the principal's active membership and applying membership
//! overrides on top. Unknown permission names, missing memberships and
//! inactive clinics deny.

use std::str::FromStr;
use std::sync::Arc;

use clinic_core::{AppError, AppResult, ClinicId, Principal};
use clinic_domain::{EffectivePermissions, Permission, PermissionAction, Resource, RoleGraph};
use tracing::warn;

use crate::{ClinicRepository, MembershipRepository, RoleRepository};

/// Application service for clinic-scoped authorization checks.
#[derive(Clone)]
pub struct AuthorizationService {
    role_repository: Arc<dyn RoleRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    clinic_repository: Arc<dyn ClinicRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from repository implementations.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        membership_repository: Arc<dyn MembershipRepository>,
        clinic_repository: Arc<dyn ClinicRepository>,
    ) -> Self {
        Self {
            role_repository,
            membership_repository,
            clinic_repository,
        }
    }

    /// Returns whether the principal holds `permission_name` in the clinic.
    pub async fn has_permission(
        &self,
        principal: &Principal,
        clinic_id: Option<ClinicId>,
        permission_name: &str,
    ) -> AppResult<bool> {
        if principal.is_admin() {
            return Ok(true);
        }

        let Ok(permission) = Permission::from_str(permission_name) else {
            return Ok(false);
        };

        let Some(clinic_id) = clinic_id else {
            return Ok(false);
        };

        Ok(self
            .resolve_effective_permissions(principal, clinic_id)
            .await?
            .is_some_and(|effective| effective.allows(permission)))
    }

    /// Ensures the principal holds `permission` in the clinic.
    pub async fn require_permission(
        &self,
        principal: &Principal,
        clinic_id: Option<ClinicId>,
        permission: Permission,
    ) -> AppResult<()> {
        if self
            .has_permission(principal, clinic_id, permission.name().as_str())
            .await?
        {
            return Ok(());
        }

        warn!(
            user_id = %principal.user_id(),
            clinic_id = ?clinic_id,
            permission = %permission,
            "permission denied"
        );
        Err(AppError::PermissionDenied {
            required: permission.name(),
        })
    }

    /// Authorizes `action` on `resource` for a request.
    ///
    /// Administrators pass without a clinic. Clinic-scoped resources need a
    /// clinic context before the evaluator runs.
    pub async fn authorize_request(
        &self,
        principal: &Principal,
        resource: Resource,
        action: PermissionAction,
    ) -> AppResult<()> {
        if principal.is_admin() {
            return Ok(());
        }

        if resource.is_clinic_scoped() && principal.clinic_id().is_none() {
            return Err(AppError::ClinicContextRequired);
        }

        self.require_permission(
            principal,
            principal.clinic_id(),
            Permission::required_for(resource, action),
        )
        .await
    }

    /// Lists the permissions the principal holds in the clinic.
    pub async fn effective_permissions(
        &self,
        principal: &Principal,
        clinic_id: Option<ClinicId>,
    ) -> AppResult<Vec<Permission>> {
        if principal.is_admin() {
            return Ok(Permission::catalog());
        }

        let Some(clinic_id) = clinic_id else {
            return Ok(Vec::new());
        };

        Ok(self
            .resolve_effective_permissions(principal, clinic_id)
            .await?
            .map(|effective| effective.granted_permissions())
            .unwrap_or_default())
    }

    async fn resolve_effective_permissions(
        &self,
        principal: &Principal,
        clinic_id: ClinicId,
    ) -> AppResult<Option<EffectivePermissions>> {
        let clinic = self.clinic_repository.find_clinic(clinic_id).await?;
        if !clinic.is_some_and(|clinic| clinic.is_active()) {
            warn!(clinic_id = %clinic_id, "clinic is missing or inactive");
            return Ok(None);
        }

        let membership = self
            .membership_repository
            .find_membership(principal.user_id(), clinic_id)
            .await?;

        let Some(membership) = membership.filter(|membership| membership.is_active()) else {
            return Ok(None);
        };

        let roles = self.role_repository.list_roles().await?;
        let graph = RoleGraph::new(&roles);
        if graph.find(membership.role_name()).is_none() {
            warn!(
                role = membership.role_name(),
                clinic_id = %clinic_id,
                "membership references a missing role"
            );
            return Ok(None);
        }

        let mut effective = graph.effective_permissions(membership.role_name())?;
        let role_is_active = graph
            .find(membership.role_name())
            .is_some_and(|role| role.is_active());
        if role_is_active {
            effective.apply(membership.permission_overrides());
        }

        Ok(Some(effective))
    }
}

#[cfg(test)]
mod tests;
