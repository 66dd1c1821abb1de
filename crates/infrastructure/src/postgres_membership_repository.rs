use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clinic_application::MembershipRepository;
use clinic_core::{AppError, AppResult, ClinicId, UserId};
use clinic_domain::{ClinicMembership, Permission, PermissionGrant};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed clinic membership repository.
#[derive(Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, condition: &str, key: Uuid) -> AppResult<Vec<ClinicMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            SELECT id, user_id, clinic_id, role_name, is_active, joined_at
            FROM clinic_memberships
            WHERE {condition} = $1
            ORDER BY joined_at
            "#
        ))
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list memberships: {error}")))?;

        let membership_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let override_rows = sqlx::query_as::<_, OverrideRow>(
            r#"
            SELECT membership_id, permission, granted
            FROM membership_overrides
            WHERE membership_id = ANY($1)
            ORDER BY membership_id, position
            "#,
        )
        .bind(&membership_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list membership overrides: {error}"))
        })?;

        let mut overrides: HashMap<Uuid, Vec<PermissionGrant>> = HashMap::new();
        for row in override_rows {
            let permission = Permission::from_str(row.permission.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "membership '{}' has a corrupt override: {error}",
                    row.membership_id
                ))
            })?;
            overrides
                .entry(row.membership_id)
                .or_default()
                .push(PermissionGrant {
                    permission,
                    granted: row.granted,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                ClinicMembership::from_storage(
                    row.id,
                    UserId::from_uuid(row.user_id),
                    ClinicId::from_uuid(row.clinic_id),
                    row.role_name,
                    overrides.remove(&row.id).unwrap_or_default(),
                    row.is_active,
                    row.joined_at,
                )
            })
            .collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    user_id: Uuid,
    clinic_id: Uuid,
    role_name: String,
    is_active: bool,
    joined_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OverrideRow {
    membership_id: Uuid,
    permission: String,
    granted: bool,
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn find_membership(
        &self,
        user_id: UserId,
        clinic_id: ClinicId,
    ) -> AppResult<Option<ClinicMembership>> {
        Ok(self
            .load("user_id", user_id.as_uuid())
            .await?
            .into_iter()
            .find(|membership| membership.clinic_id() == clinic_id))
    }

    async fn list_clinic_memberships(
        &self,
        clinic_id: ClinicId,
    ) -> AppResult<Vec<ClinicMembership>> {
        self.load("clinic_id", clinic_id.as_uuid()).await
    }

    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<ClinicMembership>> {
        self.load("user_id", user_id.as_uuid()).await
    }

    async fn save_membership(&self, membership: ClinicMembership) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let membership_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO clinic_memberships (id, user_id, clinic_id, role_name, is_active, joined_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, clinic_id) DO UPDATE
            SET role_name = EXCLUDED.role_name,
                is_active = EXCLUDED.is_active,
                joined_at = EXCLUDED.joined_at
            RETURNING id
            "#,
        )
        .bind(membership.membership_id())
        .bind(membership.user_id().as_uuid())
        .bind(membership.clinic_id().as_uuid())
        .bind(membership.role_name())
        .bind(membership.is_active())
        .bind(membership.joined_at())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to save membership: {error}")))?;

        sqlx::query("DELETE FROM membership_overrides WHERE membership_id = $1")
            .bind(membership_id)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to clear membership overrides: {error}"))
            })?;

        for (position, grant) in membership.permission_overrides().iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                AppError::Validation("too many overrides for one membership".to_owned())
            })?;

            sqlx::query(
                r#"
                INSERT INTO membership_overrides (membership_id, position, permission, granted)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(membership_id)
            .bind(position)
            .bind(grant.permission.name())
            .bind(grant.granted)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to store membership override: {error}"))
            })?;
        }

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
    }

    async fn count_active_with_role(&self, role_name: &str) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM clinic_memberships
            WHERE role_name = $1 AND is_active
            "#,
        )
        .bind(role_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count role assignments: {error}"))
        })?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}
