use async_trait::async_trait;
use clinic_application::{AuditEvent, AuditRepository, MembershipRepository, RoleRepository};
use clinic_core::{AppError, AppResult, ClinicId, UserId};
use clinic_domain::{ClinicMembership, RoleDefinition};

use super::InMemoryStore;

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let mut roles: Vec<RoleDefinition> = self.roles.read().await.values().cloned().collect();
        roles.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(roles)
    }

    async fn find_role(&self, role_name: &str) -> AppResult<Option<RoleDefinition>> {
        Ok(self.roles.read().await.get(role_name).cloned())
    }

    async fn create_role(&self, role: RoleDefinition) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        if roles.contains_key(role.name()) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        roles.insert(role.name().to_owned(), role);
        Ok(())
    }

    async fn update_role(&self, role: RoleDefinition) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        let Some(stored) = roles.get_mut(role.name()) else {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.name()
            )));
        };

        *stored = role;
        Ok(())
    }

    async fn delete_role(&self, role_name: &str) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        if roles.get(role_name).is_some_and(|role| !role.is_system()) {
            roles.remove(role_name);
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn find_membership(
        &self,
        user_id: UserId,
        clinic_id: ClinicId,
    ) -> AppResult<Option<ClinicMembership>> {
        Ok(self
            .memberships
            .read()
            .await
            .get(&(user_id, clinic_id))
            .cloned())
    }

    async fn list_clinic_memberships(
        &self,
        clinic_id: ClinicId,
    ) -> AppResult<Vec<ClinicMembership>> {
        let mut memberships: Vec<ClinicMembership> = self
            .memberships
            .read()
            .await
            .values()
            .filter(|membership| membership.clinic_id() == clinic_id)
            .cloned()
            .collect();
        memberships.sort_by_key(ClinicMembership::joined_at);
        Ok(memberships)
    }

    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<ClinicMembership>> {
        let mut memberships: Vec<ClinicMembership> = self
            .memberships
            .read()
            .await
            .values()
            .filter(|membership| membership.user_id() == user_id)
            .cloned()
            .collect();
        memberships.sort_by_key(ClinicMembership::joined_at);
        Ok(memberships)
    }

    async fn save_membership(&self, membership: ClinicMembership) -> AppResult<()> {
        let key = (membership.user_id(), membership.clinic_id());
        self.memberships.write().await.insert(key, membership);
        Ok(())
    }

    async fn count_active_with_role(&self, role_name: &str) -> AppResult<u64> {
        let count = self
            .memberships
            .read()
            .await
            .values()
            .filter(|membership| membership.is_active() && membership.role_name() == role_name)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl AuditRepository for InMemoryStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        tracing::debug!(
            action = event.action.as_str(),
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            "audit event recorded"
        );
        self.audit_events.write().await.push(event);
        Ok(())
    }
}
