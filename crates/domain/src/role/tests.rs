use std::str::FromStr;

use clinic_core::AppError;
use proptest::prelude::*;

use super::{PermissionGrant, RoleDefinition, RoleGraph, validate_role_name};
use crate::Permission;

fn permission(value: &str) -> Permission {
    Permission::from_str(value).unwrap_or_else(|_| panic!("known permission {value}"))
}

fn role(name: &str, grants: Vec<PermissionGrant>, priority: i32, bases: &[&str]) -> RoleDefinition {
    RoleDefinition::new(
        name,
        name,
        grants,
        priority,
        bases.iter().map(|base| (*base).to_owned()).collect(),
    )
    .unwrap_or_else(|_| panic!("valid role {name}"))
}

#[test]
fn role_name_must_be_snake_case() {
    assert!(validate_role_name("front_desk_2").is_ok());
    assert!(validate_role_name("FrontDesk").is_err());
    assert!(validate_role_name("2nd_shift").is_err());
    assert!(validate_role_name("").is_err());
    assert!(validate_role_name(&"a".repeat(65)).is_err());
}

#[test]
fn role_cannot_inherit_from_itself() {
    let result = RoleDefinition::new("loop", "Loop", Vec::new(), 0, vec!["loop".to_owned()]);
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn own_revoke_overrides_inherited_allow() {
    let roles = vec![
        role(
            "base",
            vec![
                PermissionGrant::allow(permission("patients.view")),
                PermissionGrant::allow(permission("invoices.view")),
            ],
            0,
            &[],
        ),
        role(
            "child",
            vec![PermissionGrant::revoke(permission("patients.view"))],
            10,
            &["base"],
        ),
    ];

    let effective = RoleGraph::new(&roles)
        .effective_permissions("child")
        .unwrap_or_default();
    assert!(!effective.allows(permission("patients.view")));
    assert!(effective.allows(permission("invoices.view")));
}

#[test]
fn higher_priority_base_wins_conflicts() {
    let roles = vec![
        role(
            "lenient",
            vec![PermissionGrant::allow(permission("payroll.view"))],
            10,
            &[],
        ),
        role(
            "strict",
            vec![PermissionGrant::revoke(permission("payroll.view"))],
            20,
            &[],
        ),
        role("combined", Vec::new(), 0, &["lenient", "strict"]),
    ];

    let effective = RoleGraph::new(&roles)
        .effective_permissions("combined")
        .unwrap_or_default();
    assert!(!effective.allows(permission("payroll.view")));
}

#[test]
fn equal_priority_conflict_resolves_to_revoke() {
    let roles = vec![
        role(
            "first",
            vec![PermissionGrant::revoke(permission("reports.view"))],
            5,
            &[],
        ),
        role(
            "second",
            vec![PermissionGrant::allow(permission("reports.view"))],
            5,
            &[],
        ),
        role("combined", Vec::new(), 0, &["first", "second"]),
    ];

    let effective = RoleGraph::new(&roles)
        .effective_permissions("combined")
        .unwrap_or_default();
    assert!(!effective.allows(permission("reports.view")));
}

#[test]
fn inactive_role_resolves_to_nothing() {
    let roles = vec![
        role(
            "base",
            vec![PermissionGrant::allow(permission("patients.view"))],
            0,
            &[],
        ),
        role(
            "retired",
            vec![PermissionGrant::allow(permission("invoices.view"))],
            0,
            &["base"],
        )
        .with_active(false),
    ];

    let effective = RoleGraph::new(&roles)
        .effective_permissions("retired")
        .unwrap_or_else(|_| panic!("resolvable"));
    assert!(effective.granted_permissions().is_empty());
}

#[test]
fn inactive_base_contributes_nothing() {
    let roles = vec![
        role(
            "base",
            vec![PermissionGrant::allow(permission("patients.view"))],
            0,
            &[],
        )
        .with_active(false),
        role(
            "child",
            vec![PermissionGrant::allow(permission("invoices.view"))],
            0,
            &["base"],
        ),
    ];

    let effective = RoleGraph::new(&roles)
        .effective_permissions("child")
        .unwrap_or_default();
    assert_eq!(
        effective.granted_permissions(),
        vec![permission("invoices.view")]
    );
}

#[test]
fn missing_base_is_ignored_and_missing_root_is_not_found() {
    let roles = vec![role(
        "orphan",
        vec![PermissionGrant::allow(permission("inventory.view"))],
        0,
        &["ghost"],
    )];
    let graph = RoleGraph::new(&roles);

    let effective = graph.effective_permissions("orphan").unwrap_or_default();
    assert!(effective.allows(permission("inventory.view")));
    assert!(matches!(
        graph.effective_permissions("ghost"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn cycle_is_reported_as_internal_error() {
    let roles = vec![
        role("alpha", Vec::new(), 0, &["beta"]),
        role("beta", Vec::new(), 0, &["gamma"]),
        role("gamma", Vec::new(), 0, &["alpha"]),
    ];

    assert!(matches!(
        RoleGraph::new(&roles).effective_permissions("alpha"),
        Err(AppError::Internal(_))
    ));
}

#[test]
fn candidate_that_closes_a_cycle_is_rejected() {
    let roles = vec![
        role("alpha", Vec::new(), 0, &[]),
        role("beta", Vec::new(), 0, &["alpha"]),
    ];
    let graph = RoleGraph::new(&roles);

    let rewired = role("alpha", Vec::new(), 0, &["beta"]);
    assert!(matches!(
        graph.validate_candidate(&rewired),
        Err(AppError::Validation(_))
    ));

    let unknown_base = role("delta", Vec::new(), 0, &["missing"]);
    assert!(matches!(
        graph.validate_candidate(&unknown_base),
        Err(AppError::Validation(_))
    ));

    let fine = role("delta", Vec::new(), 0, &["beta"]);
    assert!(graph.validate_candidate(&fine).is_ok());
}

#[test]
fn deep_chain_resolves_without_recursion() {
    let mut roles = vec![role(
        "level_0",
        vec![PermissionGrant::allow(permission("patients.view"))],
        0,
        &[],
    )];
    for level in 1..2_000 {
        let base = format!("level_{}", level - 1);
        roles.push(role(&format!("level_{level}"), Vec::new(), 0, &[base.as_str()]));
    }

    let effective = RoleGraph::new(&roles)
        .effective_permissions("level_1999")
        .unwrap_or_default();
    assert!(effective.allows(permission("patients.view")));
}

#[test]
fn dependents_are_listed_sorted() {
    let roles = vec![
        role("base", Vec::new(), 0, &[]),
        role("zeta", Vec::new(), 0, &["base"]),
        role("alpha", Vec::new(), 0, &["base"]),
        role("other", Vec::new(), 0, &[]),
    ];
    assert_eq!(RoleGraph::new(&roles).dependents_of("base"), vec!["alpha", "zeta"]);
}

#[test]
fn replacing_granted_permissions_is_idempotent() {
    let requested = vec![
        permission("patients.view"),
        permission("appointments.create"),
        permission("patients.view"),
    ];
    let original = role(
        "front_desk",
        vec![PermissionGrant::revoke(permission("invoices.view"))],
        0,
        &[],
    );

    let once = original.clone().with_granted_permissions(&requested);
    let twice = once.clone().with_granted_permissions(&requested);
    assert_eq!(once, twice);
    assert_eq!(once.grants().len(), 2);
    assert!(once.grants().iter().all(|grant| grant.granted));
}

fn any_permission() -> impl Strategy<Value = Permission> {
    let catalog = Permission::catalog();
    (0..catalog.len()).prop_map(move |index| catalog[index])
}

fn any_grants() -> impl Strategy<Value = Vec<PermissionGrant>> {
    prop::collection::vec(
        (any_permission(), any::<bool>())
            .prop_map(|(permission, granted)| PermissionGrant { permission, granted }),
        0..12,
    )
}

proptest! {
    #[test]
    fn own_grants_always_override_base(
        base_grants in any_grants(),
        child_grants in any_grants(),
    ) {
        let roles = vec![
            role("base", base_grants, 0, &[]),
            role("child", child_grants.clone(), 0, &["base"]),
        ];
        let effective = RoleGraph::new(&roles)
            .effective_permissions("child")
            .unwrap_or_default();

        for grant in &child_grants {
            let last = child_grants
                .iter()
                .rev()
                .find(|candidate| candidate.permission == grant.permission)
                .map(|candidate| candidate.granted)
                .unwrap_or(false);
            prop_assert_eq!(effective.allows(grant.permission), last);
        }
    }

    #[test]
    fn permission_update_twice_matches_once(
        grants in any_grants(),
        requested in prop::collection::vec(any_permission(), 0..20),
    ) {
        let roles_once = vec![role("target", grants.clone(), 0, &[])
            .with_granted_permissions(&requested)];
        let roles_twice = vec![role("target", grants, 0, &[])
            .with_granted_permissions(&requested)
            .with_granted_permissions(&requested)];

        let once = RoleGraph::new(&roles_once)
            .effective_permissions("target")
            .unwrap_or_default();
        let twice = RoleGraph::new(&roles_twice)
            .effective_permissions("target")
            .unwrap_or_default();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn granted_set_is_subset_of_catalog(grants in any_grants()) {
        let roles = vec![role("solo", grants, 0, &[])];
        let effective = RoleGraph::new(&roles)
            .effective_permissions("solo")
            .unwrap_or_default();
        let catalog = Permission::catalog();
        prop_assert!(effective
            .granted_permissions()
            .iter()
            .all(|permission| catalog.contains(permission)));
    }
}
