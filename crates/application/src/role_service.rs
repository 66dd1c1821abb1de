//! Role administration: listing with effective permissions, creation,
//! permission replacement, protected deletion and system seeding.

use std::sync::Arc;

use clinic_core::{AppError, AppResult, Principal};
use clinic_domain::{AuditAction, Permission, RoleDefinition, RoleGraph, system_roles};
use tracing::info;

use crate::{
    AuditEvent, AuditRepository, MembershipRepository, RoleRepository, parse_permission_names,
};

/// Role together with its resolved permission set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleView {
    /// Stored definition.
    pub role: RoleDefinition,
    /// Granted permissions after inheritance.
    pub effective_permissions: Vec<Permission>,
}

/// Input for creating a custom role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique snake_case name.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Granted permission names.
    pub permissions: Vec<String>,
    /// Conflict priority.
    pub priority: i32,
    /// Roles to inherit from.
    pub base_roles: Vec<String>,
}

/// Application service for role administration.
#[derive(Clone)]
pub struct RoleService {
    role_repository: Arc<dyn RoleRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleService {
    /// Creates a new role service.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        membership_repository: Arc<dyn MembershipRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            role_repository,
            membership_repository,
            audit_repository,
        }
    }

    /// Lists every role with its effective permissions, ordered by name.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleView>> {
        let mut roles = self.role_repository.list_roles().await?;
        roles.sort_by(|left, right| left.name().cmp(right.name()));

        let graph = RoleGraph::new(&roles);
        roles
            .iter()
            .map(|role| {
                Ok(RoleView {
                    role: role.clone(),
                    effective_permissions: graph
                        .effective_permissions(role.name())?
                        .granted_permissions(),
                })
            })
            .collect()
    }

    /// Returns one role with its effective permissions.
    pub async fn get_role(&self, role_name: &str) -> AppResult<RoleView> {
        let roles = self.role_repository.list_roles().await?;
        let graph = RoleGraph::new(&roles);
        let role = graph
            .find(role_name)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' was not found")))?;

        Ok(RoleView {
            role: role.clone(),
            effective_permissions: graph.effective_permissions(role_name)?.granted_permissions(),
        })
    }

    /// Creates a custom role after validating inheritance.
    pub async fn create_role(
        &self,
        actor: &Principal,
        input: CreateRoleInput,
    ) -> AppResult<RoleView> {
        ensure_admin(actor)?;
        let permissions = parse_permission_names(&input.permissions)?;
        let role = RoleDefinition::new(
            input.name,
            input.display_name,
            Vec::new(),
            input.priority,
            input.base_roles,
        )?
        .with_granted_permissions(&permissions);

        let roles = self.role_repository.list_roles().await?;
        let graph = RoleGraph::new(&roles);
        if graph.find(role.name()).is_some() {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }
        graph.validate_candidate(&role)?;

        let role_name = role.name().to_owned();
        self.role_repository.create_role(role).await?;
        self.audit(actor, AuditAction::RoleCreated, role_name.as_str(), None)
            .await?;

        info!(role = %role_name, "role created");
        self.get_role(role_name.as_str()).await
    }

    /// Replaces a role's grants with allowing grants for exactly `names`.
    ///
    /// Unknown names reject the whole update. Applying the same list twice
    /// yields the same stored role.
    pub async fn replace_permissions(
        &self,
        actor: &Principal,
        role_name: &str,
        names: &[String],
    ) -> AppResult<RoleView> {
        ensure_admin(actor)?;
        let permissions = parse_permission_names(names)?;
        let role = self
            .role_repository
            .find_role(role_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' was not found")))?;

        let updated = role.with_granted_permissions(&permissions);
        self.role_repository.update_role(updated).await?;
        self.audit(
            actor,
            AuditAction::RolePermissionsReplaced,
            role_name,
            Some(format!("{} permissions", permissions.len())),
        )
        .await?;

        self.get_role(role_name).await
    }

    /// Deletes a custom role that nothing references.
    pub async fn delete_role(&self, actor: &Principal, role_name: &str) -> AppResult<()> {
        ensure_admin(actor)?;
        let roles = self.role_repository.list_roles().await?;
        let graph = RoleGraph::new(&roles);
        let role = graph
            .find(role_name)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_name}' was not found")))?;

        if role.is_system() {
            return Err(AppError::Forbidden(format!(
                "system role '{role_name}' cannot be deleted"
            )));
        }

        let dependents = graph.dependents_of(role_name);
        if !dependents.is_empty() {
            return Err(AppError::Conflict(format!(
                "role '{role_name}' is a base role of: {}",
                dependents.join(", ")
            )));
        }

        let assigned = self
            .membership_repository
            .count_active_with_role(role_name)
            .await?;
        if assigned > 0 {
            return Err(AppError::Conflict(format!(
                "role '{role_name}' is assigned to {assigned} active memberships"
            )));
        }

        self.role_repository.delete_role(role_name).await?;
        self.audit(actor, AuditAction::RoleDeleted, role_name, None)
            .await
    }

    /// Stores missing built-in roles and leaves existing ones untouched.
    ///
    /// Returns the number of roles created.
    pub async fn seed_system_roles(&self) -> AppResult<usize> {
        let mut created = 0;
        for role in system_roles()? {
            if self.role_repository.find_role(role.name()).await?.is_some() {
                continue;
            }

            info!(role = role.name(), "seeding system role");
            self.role_repository.create_role(role).await?;
            created += 1;
        }

        Ok(created)
    }

    async fn audit(
        &self,
        actor: &Principal,
        action: AuditAction,
        role_name: &str,
        detail: Option<String>,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                clinic_id: actor.clinic_id(),
                actor: actor.user_id(),
                action,
                resource_type: "role".to_owned(),
                resource_id: role_name.to_owned(),
                detail,
            })
            .await
    }
}

/// Role definitions are shared by every clinic, so only administrators
/// may change them.
fn ensure_admin(actor: &Principal) -> AppResult<()> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden(
            "only administrators may change role definitions".to_owned(),
        ));
    }

    Ok(())
}
