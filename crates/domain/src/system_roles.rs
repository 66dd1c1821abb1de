use clinic_core::AppResult;

use crate::{Permission, PermissionAction, PermissionGrant, Resource, RoleDefinition};

/// Name of the baseline role every clinic employee role builds on.
pub const STAFF_ROLE: &str = "staff";
/// Name of the clinic administrator role.
pub const CLINIC_ADMIN_ROLE: &str = "clinic_admin";

/// Built-in roles seeded at bootstrap.
///
/// All of them are system roles and therefore cannot be deleted.
pub fn system_roles() -> AppResult<Vec<RoleDefinition>> {
    use PermissionAction::{Create, Delete, Edit, View};
    use Resource::*;

    let roles = vec![
        RoleDefinition::new(
            STAFF_ROLE,
            "Staff",
            allow(&[(Patients, &[View]), (Appointments, &[View])]),
            0,
            Vec::new(),
        )?,
        RoleDefinition::new(
            CLINIC_ADMIN_ROLE,
            "Clinic Administrator",
            Permission::catalog()
                .into_iter()
                .map(PermissionGrant::allow)
                .collect(),
            100,
            Vec::new(),
        )?,
        RoleDefinition::new(
            "doctor",
            "Doctor",
            allow(&[
                (Patients, &[View, Create, Edit]),
                (Appointments, &[View, Create, Edit]),
                (Prescriptions, &[View, Create, Edit, Delete]),
                (LabTests, &[View, Create]),
                (XrayAnalyses, &[View, Create]),
                (Reports, &[View, Create]),
            ]),
            50,
            vec![STAFF_ROLE.to_owned()],
        )?,
        RoleDefinition::new(
            "nurse",
            "Nurse",
            allow(&[
                (Patients, &[View, Edit]),
                (Appointments, &[View, Edit]),
                (Prescriptions, &[View]),
                (LabTests, &[View]),
            ]),
            40,
            vec![STAFF_ROLE.to_owned()],
        )?,
        RoleDefinition::new(
            "receptionist",
            "Receptionist",
            allow(&[
                (Patients, &[View, Create, Edit]),
                (Appointments, &[View, Create, Edit, Delete]),
                (Invoices, &[View, Create]),
                (Payments, &[View, Create]),
            ]),
            30,
            vec![STAFF_ROLE.to_owned()],
        )?,
        RoleDefinition::new(
            "accountant",
            "Accountant",
            revoke_patient_view(allow(&[
                (Invoices, &[View, Create, Edit, Delete]),
                (Payments, &[View, Create, Edit, Delete]),
                (Payroll, &[View, Create, Edit, Delete]),
                (Reports, &[View]),
            ])),
            30,
            vec![STAFF_ROLE.to_owned()],
        )?,
        RoleDefinition::new(
            "lab_technician",
            "Lab Technician",
            allow(&[
                (LabTests, &[View, Create, Edit, Delete]),
                (XrayAnalyses, &[View, Create, Edit]),
                (Reports, &[View]),
            ]),
            30,
            vec![STAFF_ROLE.to_owned()],
        )?,
    ];

    Ok(roles.into_iter().map(RoleDefinition::into_system).collect())
}

fn allow(entries: &[(Resource, &[PermissionAction])]) -> Vec<PermissionGrant> {
    entries
        .iter()
        .flat_map(|(resource, actions)| {
            actions
                .iter()
                .map(|action| PermissionGrant::allow(Permission::required_for(*resource, *action)))
        })
        .collect()
}

// Accountants handle money, not charts.
fn revoke_patient_view(mut grants: Vec<PermissionGrant>) -> Vec<PermissionGrant> {
    grants.push(PermissionGrant::revoke(Permission::required_for(
        Resource::Patients,
        PermissionAction::View,
    )));
    grants
}
