use std::sync::Arc;

use chrono::Utc;
use clinic_core::{AppError, AppResult, ClinicId, Principal};
use clinic_domain::{AuditAction, CLINIC_ADMIN_ROLE, Clinic, ClinicMembership};
use tracing::info;

use crate::{AuditEvent, AuditRepository, ClinicRepository, MembershipRepository};

/// Application service for clinic profiles.
#[derive(Clone)]
pub struct ClinicService {
    clinic_repository: Arc<dyn ClinicRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ClinicService {
    /// Creates a new clinic service.
    #[must_use]
    pub fn new(
        clinic_repository: Arc<dyn ClinicRepository>,
        membership_repository: Arc<dyn MembershipRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            clinic_repository,
            membership_repository,
            audit_repository,
        }
    }

    /// Lists clinics visible to the principal.
    ///
    /// Administrators see every clinic; others see clinics they belong to.
    pub async fn list_clinics(&self, principal: &Principal) -> AppResult<Vec<Clinic>> {
        let mut clinics = self.clinic_repository.list_clinics().await?;

        if !principal.is_admin() {
            let memberships = self
                .membership_repository
                .list_user_memberships(principal.user_id())
                .await?;
            clinics.retain(|clinic| {
                memberships.iter().any(|membership| {
                    membership.is_active() && membership.clinic_id() == clinic.clinic_id()
                })
            });
        }

        clinics.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));
        Ok(clinics)
    }

    /// Creates a clinic. A non-admin creator becomes its clinic administrator.
    pub async fn create_clinic(
        &self,
        actor: &Principal,
        name: &str,
        code: &str,
    ) -> AppResult<Clinic> {
        let clinic = Clinic::new(name, code)?;
        self.clinic_repository.create_clinic(clinic.clone()).await?;

        if !actor.is_admin() {
            let membership = ClinicMembership::new(
                actor.user_id(),
                clinic.clinic_id(),
                CLINIC_ADMIN_ROLE,
                Vec::new(),
                Utc::now(),
            )?;
            self.membership_repository
                .save_membership(membership)
                .await?;
        }

        self.audit(actor, AuditAction::ClinicCreated, &clinic).await?;
        info!(
            clinic_id = %clinic.clinic_id(),
            code = clinic.code().as_str(),
            "clinic created"
        );
        Ok(clinic)
    }

    /// Updates name and active flag. Non-admins may only edit their current clinic.
    pub async fn update_clinic(
        &self,
        actor: &Principal,
        clinic_id: ClinicId,
        name: &str,
        is_active: bool,
    ) -> AppResult<Clinic> {
        if !actor.is_admin() && actor.clinic_id() != Some(clinic_id) {
            return Err(AppError::Forbidden(format!(
                "clinic '{clinic_id}' is not the current clinic"
            )));
        }

        let clinic = self
            .clinic_repository
            .find_clinic(clinic_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("clinic '{clinic_id}' was not found")))?
            .updated(name, is_active)?;

        self.clinic_repository.update_clinic(clinic.clone()).await?;
        self.audit(actor, AuditAction::ClinicUpdated, &clinic).await?;
        Ok(clinic)
    }

    async fn audit(
        &self,
        actor: &Principal,
        action: AuditAction,
        clinic: &Clinic,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                clinic_id: Some(clinic.clinic_id()),
                actor: actor.user_id(),
                action,
                resource_type: "clinic".to_owned(),
                resource_id: clinic.clinic_id().to_string(),
                detail: Some(clinic.code().as_str().to_owned()),
            })
            .await
    }
}
