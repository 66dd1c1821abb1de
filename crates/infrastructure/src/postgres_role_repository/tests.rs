use std::str::FromStr;

use clinic_application::RoleRepository;
use clinic_core::AppError;
use clinic_domain::{Permission, PermissionGrant, RoleDefinition};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresRoleRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres role tests: {error}");
    }

    Some(pool)
}

fn unique_name(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn permission(value: &str) -> Permission {
    Permission::from_str(value).unwrap_or_else(|_| panic!("known permission {value}"))
}

#[tokio::test]
async fn role_roundtrip_keeps_grant_order_and_bases() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool);

    let base_name = unique_name("base");
    let base = RoleDefinition::new(base_name.as_str(), "Base", Vec::new(), 1, Vec::new())
        .unwrap_or_else(|_| panic!("valid role"));
    assert!(repository.create_role(base).await.is_ok());

    let child_name = unique_name("child");
    let child = RoleDefinition::new(
        child_name.as_str(),
        "Child",
        vec![
            PermissionGrant::allow(permission("patients.view")),
            PermissionGrant::revoke(permission("patients.view")),
        ],
        5,
        vec![base_name.clone()],
    )
    .unwrap_or_else(|_| panic!("valid role"));
    assert!(repository.create_role(child.clone()).await.is_ok());

    let loaded = repository.find_role(child_name.as_str()).await.ok().flatten();
    assert_eq!(loaded, Some(child));
}

#[tokio::test]
async fn duplicate_role_name_is_a_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool);

    let name = unique_name("dup");
    let role = RoleDefinition::new(name.as_str(), "Dup", Vec::new(), 0, Vec::new())
        .unwrap_or_else(|_| panic!("valid role"));
    assert!(repository.create_role(role.clone()).await.is_ok());
    assert!(matches!(
        repository.create_role(role).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn update_replaces_grants_and_system_roles_are_not_deleted() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRoleRepository::new(pool);

    let name = unique_name("sys");
    let role = RoleDefinition::new(
        name.as_str(),
        "System",
        vec![PermissionGrant::allow(permission("invoices.view"))],
        0,
        Vec::new(),
    )
    .unwrap_or_else(|_| panic!("valid role"))
    .into_system();
    assert!(repository.create_role(role.clone()).await.is_ok());

    let updated = role.with_granted_permissions(&[permission("payments.view")]);
    assert!(repository.update_role(updated.clone()).await.is_ok());
    assert!(repository.delete_role(name.as_str()).await.is_ok());

    let loaded = repository.find_role(name.as_str()).await.ok().flatten();
    assert_eq!(loaded, Some(updated));
}
