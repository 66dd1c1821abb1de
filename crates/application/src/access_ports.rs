use async_trait::async_trait;
use clinic_core::{AppResult, ClinicId, UserId};
use clinic_domain::{AuditAction, ClinicMembership, RoleDefinition};

/// Repository port for role definitions.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists every role, active or not.
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>>;

    /// Finds a role by name.
    async fn find_role(&self, role_name: &str) -> AppResult<Option<RoleDefinition>>;

    /// Stores a new role. Fails with a conflict when the name is taken.
    async fn create_role(&self, role: RoleDefinition) -> AppResult<()>;

    /// Replaces an existing role, grants included.
    async fn update_role(&self, role: RoleDefinition) -> AppResult<()>;

    /// Deletes a role by name.
    async fn delete_role(&self, role_name: &str) -> AppResult<()>;
}

/// Repository port for clinic memberships.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Finds the membership for a user in a clinic, active or not.
    async fn find_membership(
        &self,
        user_id: UserId,
        clinic_id: ClinicId,
    ) -> AppResult<Option<ClinicMembership>>;

    /// Lists memberships of a clinic, active or not.
    async fn list_clinic_memberships(&self, clinic_id: ClinicId)
    -> AppResult<Vec<ClinicMembership>>;

    /// Lists memberships of a user across clinics, active or not.
    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<ClinicMembership>>;

    /// Inserts or replaces the membership keyed by user and clinic.
    async fn save_membership(&self, membership: ClinicMembership) -> AppResult<()>;

    /// Counts active memberships that hold the role.
    async fn count_active_with_role(&self, role_name: &str) -> AppResult<u64>;
}

/// Repository port for append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends a single audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Canonical audit event payload emitted by administration use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Clinic the action happened in, if any.
    pub clinic_id: Option<ClinicId>,
    /// User that performed the action.
    pub actor: UserId,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Resource kind targeted by the action.
    pub resource_type: String,
    /// Stable resource identifier.
    pub resource_id: String,
    /// Optional human-readable detail.
    pub detail: Option<String>,
}
