//! Clinic staff administration and clinic selection checks.

use std::sync::Arc;

use chrono::Utc;
use clinic_core::{AppError, AppResult, ClinicId, Principal, UserId};
use clinic_domain::{AuditAction, Clinic, ClinicMembership, UserAccount};
use tracing::info;

use crate::{
    AuditEvent, AuditRepository, ClinicRepository, GrantInput, MembershipRepository,
    RoleRepository, UserRepository, parse_grants,
};

/// Active staff member of a clinic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    /// Membership in the clinic.
    pub membership: ClinicMembership,
    /// Member account.
    pub account: UserAccount,
}

/// Input for adding a user to a clinic or changing their role there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffAssignmentInput {
    /// Role to hold in the clinic.
    pub role_name: String,
    /// Per-membership overrides.
    pub permission_overrides: Vec<GrantInput>,
}

/// Application service for clinic memberships.
#[derive(Clone)]
pub struct MembershipService {
    membership_repository: Arc<dyn MembershipRepository>,
    role_repository: Arc<dyn RoleRepository>,
    user_repository: Arc<dyn UserRepository>,
    clinic_repository: Arc<dyn ClinicRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl MembershipService {
    /// Creates a new membership service.
    #[must_use]
    pub fn new(
        membership_repository: Arc<dyn MembershipRepository>,
        role_repository: Arc<dyn RoleRepository>,
        user_repository: Arc<dyn UserRepository>,
        clinic_repository: Arc<dyn ClinicRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            membership_repository,
            role_repository,
            user_repository,
            clinic_repository,
            audit_repository,
        }
    }

    /// Lists active staff of the clinic ordered by email.
    pub async fn list_staff(&self, clinic_id: ClinicId) -> AppResult<Vec<StaffMember>> {
        let memberships = self
            .membership_repository
            .list_clinic_memberships(clinic_id)
            .await?;

        let mut staff = Vec::new();
        for membership in memberships.into_iter().filter(ClinicMembership::is_active) {
            if let Some(user) = self
                .user_repository
                .find_by_id(membership.user_id())
                .await?
            {
                staff.push(StaffMember {
                    membership,
                    account: user.account,
                });
            }
        }
        staff.sort_by(|left, right| {
            left.account
                .email()
                .as_str()
                .cmp(right.account.email().as_str())
        });

        Ok(staff)
    }

    /// Adds a user to the clinic, reactivating a previous membership.
    pub async fn add_staff(
        &self,
        actor: &Principal,
        clinic_id: ClinicId,
        user_id: UserId,
        input: StaffAssignmentInput,
    ) -> AppResult<StaffMember> {
        let overrides = parse_grants(&input.permission_overrides)?;
        self.ensure_role_exists(input.role_name.as_str()).await?;
        let account = self.find_account(user_id).await?;

        let existing = self
            .membership_repository
            .find_membership(user_id, clinic_id)
            .await?;
        let membership = match existing {
            Some(membership) if membership.is_active() => {
                return Err(AppError::Conflict(format!(
                    "user '{user_id}' is already a member of clinic '{clinic_id}'"
                )));
            }
            Some(membership) => membership.reactivated(input.role_name, overrides, Utc::now())?,
            None => {
                ClinicMembership::new(user_id, clinic_id, input.role_name, overrides, Utc::now())?
            }
        };

        self.membership_repository
            .save_membership(membership.clone())
            .await?;
        self.audit(actor, clinic_id, AuditAction::MembershipAdded, &membership)
            .await?;
        info!(
            user_id = %user_id,
            clinic_id = %clinic_id,
            role = membership.role_name(),
            "staff added"
        );

        Ok(StaffMember {
            membership,
            account,
        })
    }

    /// Changes role and overrides of an active member.
    pub async fn update_staff(
        &self,
        actor: &Principal,
        clinic_id: ClinicId,
        user_id: UserId,
        input: StaffAssignmentInput,
    ) -> AppResult<StaffMember> {
        let overrides = parse_grants(&input.permission_overrides)?;
        self.ensure_role_exists(input.role_name.as_str()).await?;
        let account = self.find_account(user_id).await?;

        let membership = self
            .find_active(user_id, clinic_id)
            .await?
            .with_role(input.role_name, overrides)?;

        self.membership_repository
            .save_membership(membership.clone())
            .await?;
        self.audit(actor, clinic_id, AuditAction::MembershipUpdated, &membership)
            .await?;

        Ok(StaffMember {
            membership,
            account,
        })
    }

    /// Deactivates an active member.
    pub async fn remove_staff(
        &self,
        actor: &Principal,
        clinic_id: ClinicId,
        user_id: UserId,
    ) -> AppResult<()> {
        let membership = self.find_active(user_id, clinic_id).await?.deactivated();

        self.membership_repository
            .save_membership(membership.clone())
            .await?;
        self.audit(actor, clinic_id, AuditAction::MembershipDeactivated, &membership)
            .await
    }

    /// Lists active clinics the user is an active member of, ordered by name.
    pub async fn list_user_clinics(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<(Clinic, ClinicMembership)>> {
        let memberships = self
            .membership_repository
            .list_user_memberships(user_id)
            .await?;

        let mut clinics = Vec::new();
        for membership in memberships.into_iter().filter(ClinicMembership::is_active) {
            if let Some(clinic) = self
                .clinic_repository
                .find_clinic(membership.clinic_id())
                .await?
                .filter(Clinic::is_active)
            {
                clinics.push((clinic, membership));
            }
        }
        clinics.sort_by(|left, right| left.0.name().as_str().cmp(right.0.name().as_str()));

        Ok(clinics)
    }

    /// Ensures the principal may select the clinic as request context.
    ///
    /// Administrators may enter any existing clinic; everyone else needs an
    /// active membership.
    pub async fn ensure_can_enter(
        &self,
        principal: &Principal,
        clinic_id: ClinicId,
    ) -> AppResult<Clinic> {
        let clinic = self
            .clinic_repository
            .find_clinic(clinic_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("clinic '{clinic_id}' was not found")))?;

        if principal.is_admin() {
            return Ok(clinic);
        }

        let is_member = self
            .membership_repository
            .find_membership(principal.user_id(), clinic_id)
            .await?
            .is_some_and(|membership| membership.is_active());
        if !is_member || !clinic.is_active() {
            return Err(AppError::Forbidden(format!(
                "user '{}' is not an active member of clinic '{clinic_id}'",
                principal.user_id()
            )));
        }

        Ok(clinic)
    }

    async fn ensure_role_exists(&self, role_name: &str) -> AppResult<()> {
        if self.role_repository.find_role(role_name).await?.is_none() {
            return Err(AppError::Validation(format!(
                "role '{role_name}' does not exist"
            )));
        }

        Ok(())
    }

    async fn find_account(&self, user_id: UserId) -> AppResult<UserAccount> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .map(|user| user.account)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
    }

    async fn find_active(
        &self,
        user_id: UserId,
        clinic_id: ClinicId,
    ) -> AppResult<ClinicMembership> {
        self.membership_repository
            .find_membership(user_id, clinic_id)
            .await?
            .filter(ClinicMembership::is_active)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{user_id}' is not a member of clinic '{clinic_id}'"
                ))
            })
    }

    async fn audit(
        &self,
        actor: &Principal,
        clinic_id: ClinicId,
        action: AuditAction,
        membership: &ClinicMembership,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                clinic_id: Some(clinic_id),
                actor: actor.user_id(),
                action,
                resource_type: "membership".to_owned(),
                resource_id: membership.membership_id().to_string(),
                detail: Some(format!(
                    "user={} role={}",
                    membership.user_id(),
                    membership.role_name()
                )),
            })
            .await
    }
}
