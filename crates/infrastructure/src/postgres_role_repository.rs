use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use clinic_application::RoleRepository;
use clinic_core::{AppError, AppResult};
use clinic_domain::{Permission, PermissionGrant, RoleDefinition};
use sqlx::{PgPool, Postgres, Transaction};

#[cfg(test)]
mod tests;

/// PostgreSQL-backed role repository.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    name: String,
    display_name: String,
    priority: i32,
    is_system: bool,
    is_active: bool,
    base_roles: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct GrantRow {
    role_name: String,
    permission: String,
    granted: bool,
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<RoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, display_name, priority, is_system, is_active, base_roles
            FROM roles
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        let grant_rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT role_name, permission, granted
            FROM role_grants
            ORDER BY role_name, position
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role grants: {error}")))?;

        let mut grants_by_role: HashMap<String, Vec<GrantRow>> = HashMap::new();
        for grant in grant_rows {
            grants_by_role
                .entry(grant.role_name.clone())
                .or_default()
                .push(grant);
        }

        rows.into_iter()
            .map(|row| {
                let grants = grants_by_role.remove(row.name.as_str()).unwrap_or_default();
                role_from_rows(row, grants)
            })
            .collect()
    }

    async fn find_role(&self, role_name: &str) -> AppResult<Option<RoleDefinition>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT name, display_name, priority, is_system, is_active, base_roles
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(role_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let grants = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT role_name, permission, granted
            FROM role_grants
            WHERE role_name = $1
            ORDER BY position
            "#,
        )
        .bind(role_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role grants: {error}")))?;

        role_from_rows(row, grants).map(Some)
    }

    async fn create_role(&self, role: RoleDefinition) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO roles (name, display_name, priority, is_system, is_active, base_roles)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(role.name())
        .bind(role.display_name())
        .bind(role.priority())
        .bind(role.is_system())
        .bind(role.is_active())
        .bind(role.base_roles())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!("role '{}' already exists", role.name()));
            }

            AppError::Internal(format!("failed to create role: {error}"))
        })?;

        insert_grants(&mut transaction, role.name(), role.grants()).await?;
        commit(transaction).await
    }

    async fn update_role(&self, role: RoleDefinition) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE roles
            SET display_name = $2, priority = $3, is_active = $4, base_roles = $5
            WHERE name = $1
            "#,
        )
        .bind(role.name())
        .bind(role.display_name())
        .bind(role.priority())
        .bind(role.is_active())
        .bind(role.base_roles())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role: {error}")))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.name()
            )));
        }

        sqlx::query("DELETE FROM role_grants WHERE role_name = $1")
            .bind(role.name())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear role grants: {error}"))
            })?;

        insert_grants(&mut transaction, role.name(), role.grants()).await?;
        commit(transaction).await
    }

    async fn delete_role(&self, role_name: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM roles WHERE name = $1 AND NOT is_system")
            .bind(role_name)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        Ok(())
    }
}

impl PostgresRoleRepository {
    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

async fn insert_grants(
    transaction: &mut Transaction<'_, Postgres>,
    role_name: &str,
    grants: &[PermissionGrant],
) -> AppResult<()> {
    for (position, grant) in grants.iter().enumerate() {
        let position = i32::try_from(position)
            .map_err(|_| AppError::Validation("too many grants for one role".to_owned()))?;

        sqlx::query(
            r#"
            INSERT INTO role_grants (role_name, position, permission, granted)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(role_name)
        .bind(position)
        .bind(grant.permission.name())
        .bind(grant.granted)
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to store role grant: {error}")))?;
    }

    Ok(())
}

async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

fn role_from_rows(row: RoleRow, grants: Vec<GrantRow>) -> AppResult<RoleDefinition> {
    let grants = grants
        .into_iter()
        .map(|grant| {
            Permission::from_str(grant.permission.as_str()).map(|permission| PermissionGrant {
                permission,
                granted: grant.granted,
            })
        })
        .collect::<AppResult<Vec<_>>>()
        .map_err(|error| {
            AppError::Internal(format!("role '{}' has a corrupt grant: {error}", row.name))
        })?;

    let role = RoleDefinition::new(
        row.name,
        row.display_name,
        grants,
        row.priority,
        row.base_roles,
    )?
    .with_active(row.is_active);

    Ok(if row.is_system {
        role.into_system()
    } else {
        role
    })
}
