use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grievance_application::GrievanceRepository;
use grievance_core::{AppError, AppResult};
use grievance_domain::{
    Attachment, Grievance, GrievanceCategory, GrievanceId, GrievanceStatus,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres grievance repository implementation.
#[derive(Debug, Clone)]
pub struct PostgresGrievanceRepository {
    pool: PgPool,
}

impl PostgresGrievanceRepository {
    /// Creates a repository over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GrievanceRow {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    status: String,
    submitter_email: String,
    submitter_subject: String,
    department: Option<String>,
    attachment_url: Option<String>,
    attachment_name: Option<String>,
    attachment_content_type: Option<String>,
    attachment_size_bytes: Option<i64>,
    attachment_path: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    resolved_by: Option<String>,
    resolution_note: Option<String>,
}

impl TryFrom<GrievanceRow> for Grievance {
    type Error = AppError;

    fn try_from(row: GrievanceRow) -> Result<Self, Self::Error> {
        let attachment = match (
            row.attachment_url,
            row.attachment_name,
            row.attachment_content_type,
            row.attachment_size_bytes,
        ) {
            (Some(url), Some(name), Some(content_type), Some(size_bytes)) => {
                let size_bytes = u64::try_from(size_bytes).map_err(|_| {
                    AppError::Internal(format!(
                        "stored attachment size {size_bytes} is negative"
                    ))
                })?;

                Some(Attachment::new(
                    url,
                    name,
                    content_type,
                    size_bytes,
                    row.attachment_path.unwrap_or_default(),
                )?)
            }
            _ => None,
        };

        Grievance::from_parts(
            GrievanceId::from_uuid(row.id),
            row.title,
            row.description,
            GrievanceCategory::from_str(&row.category)?,
            GrievanceStatus::from_str(&row.status)?,
            row.submitter_email,
            row.submitter_subject,
            row.department,
            attachment,
            row.created_at,
            row.updated_at,
            row.resolved_by,
            row.resolution_note,
        )
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, title, description, category, status,
           submitter_email, submitter_subject, department,
           attachment_url, attachment_name, attachment_content_type,
           attachment_size_bytes, attachment_path,
           created_at, updated_at, resolved_by, resolution_note
    FROM grievances
"#;

#[async_trait]
impl GrievanceRepository for PostgresGrievanceRepository {
    async fn insert(&self, grievance: Grievance) -> AppResult<()> {
        let attachment = grievance.attachment();

        sqlx::query(
            r#"
            INSERT INTO grievances (
                id, title, description, category, status,
                submitter_email, submitter_subject, department,
                attachment_url, attachment_name, attachment_content_type,
                attachment_size_bytes, attachment_path,
                created_at, updated_at, resolved_by, resolution_note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(grievance.id().as_uuid())
        .bind(grievance.title())
        .bind(grievance.description())
        .bind(grievance.category().as_str())
        .bind(grievance.status().as_str())
        .bind(grievance.submitter_email())
        .bind(grievance.submitter_subject())
        .bind(grievance.department())
        .bind(attachment.map(Attachment::url))
        .bind(attachment.map(Attachment::file_name))
        .bind(attachment.map(Attachment::content_type))
        .bind(attachment.map(|attachment| attachment.size_bytes() as i64))
        .bind(attachment.map(Attachment::storage_path))
        .bind(grievance.created_at())
        .bind(grievance.updated_at())
        .bind(grievance.resolved_by())
        .bind(grievance.resolution_note())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to insert grievance: {error}")))?;

        Ok(())
    }

    async fn replace(&self, grievance: Grievance) -> AppResult<()> {
        let attachment = grievance.attachment();

        let result = sqlx::query(
            r#"
            UPDATE grievances
            SET title = $2, description = $3, category = $4, status = $5,
                submitter_email = $6, submitter_subject = $7, department = $8,
                attachment_url = $9, attachment_name = $10,
                attachment_content_type = $11, attachment_size_bytes = $12,
                attachment_path = $13, created_at = $14, updated_at = $15,
                resolved_by = $16, resolution_note = $17
            WHERE id = $1
            "#,
        )
        .bind(grievance.id().as_uuid())
        .bind(grievance.title())
        .bind(grievance.description())
        .bind(grievance.category().as_str())
        .bind(grievance.status().as_str())
        .bind(grievance.submitter_email())
        .bind(grievance.submitter_subject())
        .bind(grievance.department())
        .bind(attachment.map(Attachment::url))
        .bind(attachment.map(Attachment::file_name))
        .bind(attachment.map(Attachment::content_type))
        .bind(attachment.map(|attachment| attachment.size_bytes() as i64))
        .bind(attachment.map(Attachment::storage_path))
        .bind(grievance.created_at())
        .bind(grievance.updated_at())
        .bind(grievance.resolved_by())
        .bind(grievance.resolution_note())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to update grievance: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "grievance '{}' does not exist",
                grievance.id()
            )));
        }

        Ok(())
    }

    async fn delete(&self, id: GrievanceId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM grievances WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Store(format!("failed to delete grievance: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "grievance '{id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn find(&self, id: GrievanceId) -> AppResult<Option<Grievance>> {
        let row = sqlx::query_as::<_, GrievanceRow>(&format!(
            "{SELECT_COLUMNS} WHERE id = $1 LIMIT 1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Store(format!("failed to find grievance: {error}")))?;

        row.map(Grievance::try_from).transpose()
    }

    async fn list_all(&self) -> AppResult<Vec<Grievance>> {
        let rows = sqlx::query_as::<_, GrievanceRow>(SELECT_COLUMNS)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Store(format!("failed to list grievances: {error}")))?;

        rows.into_iter().map(Grievance::try_from).collect()
    }

    async fn list_by_submitter(&self, submitter_email: &str) -> AppResult<Vec<Grievance>> {
        let rows = sqlx::query_as::<_, GrievanceRow>(&format!(
            "{SELECT_COLUMNS} WHERE submitter_email = $1"
        ))
        .bind(submitter_email)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Store(format!("failed to list grievances by submitter: {error}"))
        })?;

        rows.into_iter().map(Grievance::try_from).collect()
    }
}
