//! Request and response types for the HTTP surface.

use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use grievance_application::{
    AdminStats, AttachmentUpload, CategoryCount, StatusUpdateInput, StudentStats,
    SubmitGrievanceInput,
};
use grievance_core::{AppError, AppResult};
use grievance_domain::{
    Attachment, Grievance, GrievanceCategory, GrievanceStatus,
};
use serde::{Deserialize, Serialize};

/// Attachment metadata returned with a grievance.
#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub url: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

impl From<&Attachment> for AttachmentResponse {
    fn from(attachment: &Attachment) -> Self {
        Self {
            url: attachment.url().to_owned(),
            file_name: attachment.file_name().to_owned(),
            content_type: attachment.content_type().to_owned(),
            size_bytes: attachment.size_bytes(),
        }
    }
}

/// Grievance record as rendered to clients.
#[derive(Debug, Serialize)]
pub struct GrievanceResponse {
    pub id: String,
    /// Short `GR-` reference for list views.
    pub reference: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub submitter_email: String,
    pub department: Option<String>,
    pub attachment: Option<AttachmentResponse>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub resolved_by: Option<String>,
    pub resolution_note: Option<String>,
}

impl From<Grievance> for GrievanceResponse {
    fn from(grievance: Grievance) -> Self {
        Self {
            id: grievance.id().to_string(),
            reference: grievance.id().display_reference(),
            title: grievance.title().to_owned(),
            description: grievance.description().to_owned(),
            category: grievance.category().as_str().to_owned(),
            status: grievance.status().as_str().to_owned(),
            submitter_email: grievance.submitter_email().to_owned(),
            department: grievance.department().map(str::to_owned),
            attachment: grievance.attachment().map(AttachmentResponse::from),
            created_at: grievance.created_at(),
            updated_at: grievance.updated_at(),
            resolved_by: grievance.resolved_by().map(str::to_owned),
            resolution_note: grievance.resolution_note().map(str::to_owned),
        }
    }
}

/// Attachment bytes as submitted by the client.
#[derive(Debug, Deserialize)]
pub struct AttachmentUploadRequest {
    pub file_name: String,
    pub content_type: String,
    /// Base64-encoded file bytes.
    pub data: String,
}

impl AttachmentUploadRequest {
    fn into_upload(self) -> AppResult<AttachmentUpload> {
        let bytes = BASE64.decode(self.data.as_bytes()).map_err(|error| {
            AppError::Validation(format!("attachment data is not valid base64: {error}"))
        })?;

        Ok(AttachmentUpload {
            file_name: self.file_name,
            content_type: self.content_type,
            bytes,
        })
    }
}

/// Submission payload.
#[derive(Debug, Deserialize)]
pub struct SubmitGrievanceRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub department: Option<String>,
    pub attachment: Option<AttachmentUploadRequest>,
}

impl SubmitGrievanceRequest {
    /// Converts the payload into validated service input.
    pub fn into_input(self) -> AppResult<SubmitGrievanceInput> {
        Ok(SubmitGrievanceInput {
            title: self.title,
            description: self.description,
            category: GrievanceCategory::from_str(&self.category)?,
            department: self.department,
            attachment: self
                .attachment
                .map(AttachmentUploadRequest::into_upload)
                .transpose()?,
        })
    }
}

/// Status update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub resolution_note: Option<String>,
}

impl UpdateStatusRequest {
    /// Converts the payload into validated service input.
    pub fn into_input(self) -> AppResult<StatusUpdateInput> {
        Ok(StatusUpdateInput {
            status: GrievanceStatus::from_str(&self.status)?,
            resolution_note: self
                .resolution_note
                .filter(|note| !note.trim().is_empty()),
        })
    }
}

/// Classifier request.
#[derive(Debug, Deserialize)]
pub struct SuggestCategoryRequest {
    pub title: String,
    pub description: String,
}

/// Classifier response. `category` is `null` when no keyword matched.
#[derive(Debug, Serialize)]
pub struct SuggestCategoryResponse {
    pub category: Option<String>,
}

/// Explicit role request for a first-time account.
#[derive(Debug, Deserialize)]
pub struct ProvisionRoleRequest {
    pub role: String,
}

/// Resolved identity and dashboard routing for the caller.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub subject: String,
    pub email: String,
    pub role: String,
    pub dashboard: grievance_application::DashboardState,
}

/// Student statistics payload.
#[derive(Debug, Serialize)]
pub struct StudentStatsResponse {
    pub total: usize,
    pub resolved: usize,
    pub open: usize,
    pub average_resolution_days: u64,
}

impl From<StudentStats> for StudentStatsResponse {
    fn from(stats: StudentStats) -> Self {
        Self {
            total: stats.total,
            resolved: stats.resolved,
            open: stats.open,
            average_resolution_days: stats.average_resolution_days,
        }
    }
}

/// One admin top-category entry.
#[derive(Debug, Serialize)]
pub struct CategoryCountResponse {
    pub category: String,
    pub count: usize,
}

impl From<CategoryCount> for CategoryCountResponse {
    fn from(entry: CategoryCount) -> Self {
        Self {
            category: entry.category.as_str().to_owned(),
            count: entry.count,
        }
    }
}

/// Admin statistics payload.
#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub escalated: usize,
    pub resolution_rate_percent: u64,
    pub top_categories: Vec<CategoryCountResponse>,
    pub recent: Vec<GrievanceResponse>,
}

impl From<AdminStats> for AdminStatsResponse {
    fn from(stats: AdminStats) -> Self {
        Self {
            total: stats.total,
            pending: stats.pending,
            in_progress: stats.in_progress,
            resolved: stats.resolved,
            escalated: stats.escalated,
            resolution_rate_percent: stats.resolution_rate_percent,
            top_categories: stats
                .top_categories
                .into_iter()
                .map(CategoryCountResponse::from)
                .collect(),
            recent: stats
                .recent
                .into_iter()
                .map(GrievanceResponse::from)
                .collect(),
        }
    }
}
