use async_trait::async_trait;
use clinic_application::ClinicRepository;
use clinic_core::{AppError, AppResult, ClinicId};
use clinic_domain::Clinic;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL-backed clinic repository.
#[derive(Clone)]
pub struct PostgresClinicRepository {
    pool: PgPool,
}

impl PostgresClinicRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ClinicRow {
    id: Uuid,
    name: String,
    code: String,
    is_active: bool,
}

impl TryFrom<ClinicRow> for Clinic {
    type Error = AppError;

    fn try_from(row: ClinicRow) -> Result<Self, Self::Error> {
        Clinic::from_storage(ClinicId::from_uuid(row.id), row.name, row.code, row.is_active)
    }
}

#[async_trait]
impl ClinicRepository for PostgresClinicRepository {
    async fn list_clinics(&self) -> AppResult<Vec<Clinic>> {
        sqlx::query_as::<_, ClinicRow>(
            r#"
            SELECT id, name, code, is_active
            FROM clinics
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list clinics: {error}")))?
        .into_iter()
        .map(Clinic::try_from)
        .collect()
    }

    async fn find_clinic(&self, clinic_id: ClinicId) -> AppResult<Option<Clinic>> {
        sqlx::query_as::<_, ClinicRow>(
            r#"
            SELECT id, name, code, is_active
            FROM clinics
            WHERE id = $1
            "#,
        )
        .bind(clinic_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find clinic: {error}")))?
        .map(Clinic::try_from)
        .transpose()
    }

    async fn create_clinic(&self, clinic: Clinic) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clinics (id, name, code, is_active)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(clinic.clinic_id().as_uuid())
        .bind(clinic.name().as_str())
        .bind(clinic.code().as_str())
        .bind(clinic.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "clinic code '{}' is already used",
                    clinic.code().as_str()
                ));
            }

            AppError::Internal(format!("failed to create clinic: {error}"))
        })?;

        Ok(())
    }

    async fn update_clinic(&self, clinic: Clinic) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE clinics
            SET name = $2, is_active = $3
            WHERE id = $1
            "#,
        )
        .bind(clinic.clinic_id().as_uuid())
        .bind(clinic.name().as_str())
        .bind(clinic.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update clinic: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "clinic '{}' was not found",
                clinic.clinic_id()
            )));
        }

        Ok(())
    }
}
