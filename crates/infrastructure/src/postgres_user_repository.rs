//! PostgreSQL-backed user repository.

use std::str::FromStr;

use async_trait::async_trait;
use clinic_application::{UserRecord, UserRepository};
use clinic_core::{AppError, AppResult, GlobalRole, UserId};
use clinic_domain::UserAccount;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: String,
    password_hash: String,
    global_role: String,
    is_active: bool,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let global_role = GlobalRole::from_str(row.global_role.as_str())?;
        Ok(Self {
            account: UserAccount::from_storage(
                UserId::from_uuid(row.id),
                row.email,
                row.display_name,
                global_role,
                row.is_active,
            )?,
            password_hash: row.password_hash,
        })
    }
}

const USER_COLUMNS: &str = "id, email, display_name, password_hash, global_role, is_active";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by email: {error}")))?
        .map(UserRecord::try_from)
        .transpose()
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?
            .map(UserRecord::try_from)
            .transpose()
    }

    async fn list_users(&self) -> AppResult<Vec<UserAccount>> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY email"))
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?
            .into_iter()
            .map(|row| UserRecord::try_from(row).map(|record| record.account))
            .collect()
    }

    async fn create_user(&self, account: UserAccount, password_hash: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, global_role, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.user_id().as_uuid())
        .bind(account.email().as_str())
        .bind(account.display_name().as_str())
        .bind(password_hash)
        .bind(account.global_role().as_str())
        .bind(account.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| email_conflict_or_internal(error, "create user"))?;

        Ok(())
    }

    async fn update_user(&self, account: UserAccount) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET display_name = $2, global_role = $3, is_active = $4
            WHERE id = $1
            "#,
        )
        .bind(account.user_id().as_uuid())
        .bind(account.display_name().as_str())
        .bind(account.global_role().as_str())
        .bind(account.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update user: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "user '{}' was not found",
                account.user_id()
            )));
        }

        Ok(())
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id.as_uuid())
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to update password: {error}")))?;

        Ok(())
    }
}

fn email_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("an account with this email already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
