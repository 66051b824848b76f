use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grievance_application::RoleRepository;
use grievance_core::{AppError, AppResult};
use grievance_domain::{AccessRole, RoleRecord};
use sqlx::PgPool;

/// Postgres role-record repository implementation.
#[derive(Debug, Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
    subject: String,
    email: String,
    display_name: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for RoleRecord {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(RoleRecord::new(
            row.subject,
            row.email,
            row.display_name,
            AccessRole::from_str(&row.role)?,
            row.created_at,
        ))
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<RoleRecord>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT subject, email, display_name, role, created_at
            FROM user_roles
            WHERE subject = $1
            LIMIT 1
            "#,
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to find role record: {error}")))?;

        row.map(RoleRecord::try_from).transpose()
    }

    async fn insert(&self, record: RoleRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (subject, email, display_name, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.subject())
        .bind(record.email())
        .bind(record.display_name())
        .bind(record.role().as_str())
        .bind(record.created_at())
        .execute(&self.pool)
        .await
        .map_err(|error| match error.as_database_error() {
            Some(database_error) if database_error.is_unique_violation() => AppError::Conflict(
                format!("role record for subject '{}' already exists", record.subject()),
            ),
            _ => AppError::Store(format!("failed to insert role record: {error}")),
        })?;

        Ok(())
    }
}
