use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use clinic_core::{AppError, ClinicId, GlobalRole, Principal, UserId};
use clinic_domain::{
    Clinic, ClinicMembership, Permission, PermissionAction, PermissionGrant, Resource,
    RoleDefinition, system_roles,
};

use crate::test_support::{FakeClinicRepository, FakeMembershipRepository, FakeRoleRepository};

use super::AuthorizationService;

fn permission(value: &str) -> Permission {
    Permission::from_str(value).unwrap_or_else(|_| panic!("known permission {value}"))
}

fn principal(role: GlobalRole) -> Principal {
    Principal::new(UserId::new(), "Test User", "test@clinic.org", role)
}

fn membership(
    principal: &Principal,
    clinic_id: ClinicId,
    role_name: &str,
    overrides: Vec<PermissionGrant>,
) -> ClinicMembership {
    ClinicMembership::new(principal.user_id(), clinic_id, role_name, overrides, Utc::now())
        .unwrap_or_else(|_| panic!("valid membership"))
}

fn clinic(clinic_id: ClinicId, is_active: bool) -> Clinic {
    Clinic::from_storage(clinic_id, "Test Clinic".to_owned(), "test-clinic".to_owned(), is_active)
        .unwrap_or_else(|_| panic!("valid clinic"))
}

fn service(roles: Vec<RoleDefinition>, memberships: Vec<ClinicMembership>) -> AuthorizationService {
    let clinics = memberships
        .iter()
        .map(|membership| clinic(membership.clinic_id(), true))
        .collect();
    service_with_clinics(roles, memberships, clinics)
}

fn service_with_clinics(
    roles: Vec<RoleDefinition>,
    memberships: Vec<ClinicMembership>,
    clinics: Vec<Clinic>,
) -> AuthorizationService {
    AuthorizationService::new(
        Arc::new(FakeRoleRepository::with_roles(roles)),
        Arc::new(FakeMembershipRepository::with_memberships(memberships)),
        Arc::new(FakeClinicRepository::with_clinics(clinics)),
    )
}

#[tokio::test]
async fn admin_passes_without_membership_or_clinic() {
    let admin = principal(GlobalRole::Admin);
    let service = service(Vec::new(), Vec::new());

    for name in ["patients.delete", "settings.general", "not.a.permission"] {
        let allowed = service.has_permission(&admin, None, name).await;
        assert!(allowed.is_ok_and(|allowed| allowed));
    }
    assert!(
        service
            .authorize_request(&admin, Resource::Patients, PermissionAction::Delete)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn non_member_is_denied_everything() {
    let doctor = principal(GlobalRole::Doctor);
    let member_clinic = ClinicId::new();
    let other_clinic = ClinicId::new();
    let service = service(
        system_roles().unwrap_or_default(),
        vec![membership(&doctor, member_clinic, "doctor", Vec::new())],
    );

    for permission in Permission::catalog() {
        let allowed = service
            .has_permission(&doctor, Some(other_clinic), permission.name().as_str())
            .await;
        assert!(allowed.is_ok_and(|allowed| !allowed));
    }

    let allowed = service
        .has_permission(&doctor, Some(member_clinic), "patients.view")
        .await;
    assert!(allowed.is_ok_and(|allowed| allowed));
}

#[tokio::test]
async fn missing_clinic_and_unknown_names_deny() {
    let nurse = principal(GlobalRole::Nurse);
    let clinic_id = ClinicId::new();
    let service = service(
        system_roles().unwrap_or_default(),
        vec![membership(&nurse, clinic_id, "nurse", Vec::new())],
    );

    assert!(
        service
            .has_permission(&nurse, None, "patients.view")
            .await
            .is_ok_and(|allowed| !allowed)
    );
    assert!(
        service
            .has_permission(&nurse, Some(clinic_id), "patients.teleport")
            .await
            .is_ok_and(|allowed| !allowed)
    );
}

#[tokio::test]
async fn inactive_membership_denies() {
    let receptionist = principal(GlobalRole::Receptionist);
    let clinic_id = ClinicId::new();
    let service = service(
        system_roles().unwrap_or_default(),
        vec![membership(&receptionist, clinic_id, "receptionist", Vec::new()).deactivated()],
    );

    assert!(
        service
            .has_permission(&receptionist, Some(clinic_id), "appointments.view")
            .await
            .is_ok_and(|allowed| !allowed)
    );
}

#[tokio::test]
async fn membership_overrides_win_over_role_grants() {
    let receptionist = principal(GlobalRole::Receptionist);
    let clinic_id = ClinicId::new();
    let service = service(
        system_roles().unwrap_or_default(),
        vec![membership(
            &receptionist,
            clinic_id,
            "receptionist",
            vec![
                PermissionGrant::revoke(permission("appointments.create")),
                PermissionGrant::allow(permission("payroll.view")),
            ],
        )],
    );

    assert!(
        service
            .has_permission(&receptionist, Some(clinic_id), "appointments.create")
            .await
            .is_ok_and(|allowed| !allowed)
    );
    assert!(
        service
            .has_permission(&receptionist, Some(clinic_id), "payroll.view")
            .await
            .is_ok_and(|allowed| allowed)
    );
}

#[tokio::test]
async fn inactive_role_ignores_overrides() {
    let staff = principal(GlobalRole::Staff);
    let clinic_id = ClinicId::new();
    let retired = RoleDefinition::new(
        "retired",
        "Retired",
        vec![PermissionGrant::allow(permission("inventory.view"))],
        0,
        Vec::new(),
    )
    .unwrap_or_else(|_| panic!("valid role"))
    .with_active(false);
    let service = service(
        vec![retired],
        vec![membership(
            &staff,
            clinic_id,
            "retired",
            vec![PermissionGrant::allow(permission("inventory.edit"))],
        )],
    );

    let effective = service
        .effective_permissions(&staff, Some(clinic_id))
        .await
        .unwrap_or_else(|_| panic!("resolvable"));
    assert!(effective.is_empty());
}

#[tokio::test]
async fn missing_role_record_denies() {
    let staff = principal(GlobalRole::Staff);
    let clinic_id = ClinicId::new();
    let service = service(
        Vec::new(),
        vec![membership(&staff, clinic_id, "ghost", Vec::new())],
    );

    assert!(
        service
            .has_permission(&staff, Some(clinic_id), "patients.view")
            .await
            .is_ok_and(|allowed| !allowed)
    );
}

#[tokio::test]
async fn cyclic_roles_surface_internal_error() {
    let staff = principal(GlobalRole::Staff);
    let clinic_id = ClinicId::new();
    let first = RoleDefinition::new("first", "First", Vec::new(), 0, vec!["second".to_owned()])
        .unwrap_or_else(|_| panic!("valid role"));
    let second = RoleDefinition::new("second", "Second", Vec::new(), 0, vec!["first".to_owned()])
        .unwrap_or_else(|_| panic!("valid role"));
    let service = service(
        vec![first, second],
        vec![membership(&staff, clinic_id, "first", Vec::new())],
    );

    let result = service
        .has_permission(&staff, Some(clinic_id), "patients.view")
        .await;
    assert!(matches!(result, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn authorize_request_requires_clinic_for_scoped_resources() {
    let accountant = principal(GlobalRole::Accountant);
    let service = service(system_roles().unwrap_or_default(), Vec::new());

    let result = service
        .authorize_request(&accountant, Resource::Invoices, PermissionAction::View)
        .await;
    assert!(matches!(result, Err(AppError::ClinicContextRequired)));

    let result = service
        .authorize_request(&accountant, Resource::Settings, PermissionAction::View)
        .await;
    assert!(matches!(
        result,
        Err(AppError::PermissionDenied { required }) if required == "settings.view"
    ));
}

#[tokio::test]
async fn settings_write_needs_only_general_grant() {
    let clinic_id = ClinicId::new();
    let manager = principal(GlobalRole::Staff).with_clinic(Some(clinic_id));
    let settings_manager = RoleDefinition::new(
        "settings_manager",
        "Settings Manager",
        vec![PermissionGrant::allow(permission("settings.general"))],
        0,
        Vec::new(),
    )
    .unwrap_or_else(|_| panic!("valid role"));
    let service = service(
        vec![settings_manager],
        vec![membership(&manager, clinic_id, "settings_manager", Vec::new())],
    );

    assert!(
        service
            .authorize_request(&manager, Resource::Settings, PermissionAction::Edit)
            .await
            .is_ok()
    );
    assert!(
        service
            .authorize_request(&manager, Resource::Settings, PermissionAction::View)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn receptionist_may_create_appointments() {
    let clinic_id = ClinicId::new();
    let receptionist = principal(GlobalRole::Receptionist).with_clinic(Some(clinic_id));
    let service = service(
        system_roles().unwrap_or_default(),
        vec![membership(&receptionist, clinic_id, "receptionist", Vec::new())],
    );

    assert!(
        service
            .authorize_request(&receptionist, Resource::Appointments, PermissionAction::Create)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn inactive_or_unknown_clinic_denies_members() {
    let nurse = principal(GlobalRole::Nurse);
    let closed_clinic = ClinicId::new();
    let unknown_clinic = ClinicId::new();
    let service = service_with_clinics(
        system_roles().unwrap_or_default(),
        vec![
            membership(&nurse, closed_clinic, "nurse", Vec::new()),
            membership(&nurse, unknown_clinic, "nurse", Vec::new()),
        ],
        vec![clinic(closed_clinic, false)],
    );

    for clinic_id in [closed_clinic, unknown_clinic] {
        let allowed = service
            .has_permission(&nurse, Some(clinic_id), "appointments.view")
            .await;
        assert!(allowed.is_ok_and(|allowed| !allowed));

        let listed = service.effective_permissions(&nurse, Some(clinic_id)).await;
        assert!(listed.is_ok_and(|permissions| permissions.is_empty()));
    }

    let in_clinic = nurse.with_clinic(Some(closed_clinic));
    assert!(matches!(
        service
            .authorize_request(&in_clinic, Resource::Appointments, PermissionAction::View)
            .await,
        Err(AppError::PermissionDenied { .. })
    ));
}
