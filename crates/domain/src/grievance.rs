//! Grievance record: categories, status state machine, attachment rules.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use grievance_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a grievance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrievanceId(Uuid);

impl GrievanceId {
    /// Creates a new random grievance identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a grievance identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Short display reference (`GR-` + first 4 id characters) used in
    /// list views.
    #[must_use]
    pub fn display_reference(&self) -> String {
        format!("GR-{}", &self.0.to_string()[..4])
    }

    /// Long display reference (`GR-` + first 8 id characters) used in
    /// detail views and exports.
    #[must_use]
    pub fn export_reference(&self) -> String {
        format!("GR-{}", &self.0.to_string()[..8])
    }
}

impl Default for GrievanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GrievanceId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Closed set of grievance categories. Declaration order is the
/// classifier's tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrievanceCategory {
    /// Courses, exams, grading.
    Academic,
    /// Campus facilities and utilities.
    Infrastructure,
    /// Hostel accommodation and mess.
    Hostel,
    /// Library services.
    Library,
    /// Buses and shuttles.
    Transport,
    /// Fees, certificates, office processes.
    Administrative,
}

impl GrievanceCategory {
    /// Returns the stable storage value for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Academic => "Academic",
            Self::Infrastructure => "Infrastructure",
            Self::Hostel => "Hostel",
            Self::Library => "Library",
            Self::Transport => "Transport",
            Self::Administrative => "Administrative",
        }
    }

    /// Returns all categories in declaration order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[GrievanceCategory] = &[
            GrievanceCategory::Academic,
            GrievanceCategory::Infrastructure,
            GrievanceCategory::Hostel,
            GrievanceCategory::Library,
            GrievanceCategory::Transport,
            GrievanceCategory::Administrative,
        ];

        ALL
    }
}

impl FromStr for GrievanceCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Academic" => Ok(Self::Academic),
            "Infrastructure" => Ok(Self::Infrastructure),
            "Hostel" => Ok(Self::Hostel),
            "Library" => Ok(Self::Library),
            "Transport" => Ok(Self::Transport),
            "Administrative" => Ok(Self::Administrative),
            _ => Err(AppError::Validation(format!(
                "unknown grievance category '{value}'"
            ))),
        }
    }
}

/// Grievance status. Any staff role may move a record to any status;
/// no status is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrievanceStatus {
    /// Initial status for every new grievance.
    Pending,
    /// A staff member is working the case.
    InProgress,
    /// The case has been resolved.
    Resolved,
    /// The case was escalated beyond the first responder.
    Escalated,
}

impl GrievanceStatus {
    /// Returns the stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Escalated => "Escalated",
        }
    }

    /// Returns whether the status counts as an open case.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl FromStr for GrievanceStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Pending" => Ok(Self::Pending),
            "In Progress" => Ok(Self::InProgress),
            "Resolved" => Ok(Self::Resolved),
            "Escalated" => Ok(Self::Escalated),
            _ => Err(AppError::Validation(format!(
                "unknown grievance status '{value}'"
            ))),
        }
    }
}

/// Maximum allowed attachment size in bytes (500 KiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 500 * 1024;

/// Uploaded attachment metadata. Validated before any blob-store write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    url: String,
    file_name: String,
    content_type: String,
    size_bytes: u64,
    storage_path: String,
}

impl Attachment {
    /// Creates validated attachment metadata.
    pub fn new(
        url: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        size_bytes: u64,
        storage_path: impl Into<String>,
    ) -> AppResult<Self> {
        if size_bytes > MAX_ATTACHMENT_BYTES {
            return Err(AppError::Validation(format!(
                "attachment exceeds the {MAX_ATTACHMENT_BYTES}-byte limit ({size_bytes} bytes)"
            )));
        }

        Ok(Self {
            url: url.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            size_bytes,
            storage_path: storage_path.into(),
        })
    }

    /// Returns the retrievable URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// Returns the MIME content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.content_type.as_str()
    }

    /// Returns the size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Returns the blob-store path the bytes were written to.
    #[must_use]
    pub fn storage_path(&self) -> &str {
        self.storage_path.as_str()
    }
}

/// A single complaint record filed by a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grievance {
    id: GrievanceId,
    title: NonEmptyString,
    description: NonEmptyString,
    category: GrievanceCategory,
    status: GrievanceStatus,
    submitter_email: String,
    submitter_subject: String,
    department: Option<String>,
    attachment: Option<Attachment>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    resolved_by: Option<String>,
    resolution_note: Option<String>,
}

impl Grievance {
    /// Creates a newly submitted grievance: always `Pending`, submitter
    /// fixed, timestamps stamped with the store clock.
    #[allow(clippy::too_many_arguments)]
    pub fn submitted(
        title: impl Into<String>,
        description: impl Into<String>,
        category: GrievanceCategory,
        submitter_email: impl Into<String>,
        submitter_subject: impl Into<String>,
        department: Option<String>,
        attachment: Option<Attachment>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: GrievanceId::new(),
            title: NonEmptyString::new(title)?,
            description: NonEmptyString::new(description)?,
            category,
            status: GrievanceStatus::Pending,
            submitter_email: submitter_email.into(),
            submitter_subject: submitter_subject.into(),
            department,
            attachment,
            created_at: Some(now),
            updated_at: Some(now),
            resolved_by: None,
            resolution_note: None,
        })
    }

    /// Rehydrates a grievance from persisted fields without re-stamping.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: GrievanceId,
        title: impl Into<String>,
        description: impl Into<String>,
        category: GrievanceCategory,
        status: GrievanceStatus,
        submitter_email: impl Into<String>,
        submitter_subject: impl Into<String>,
        department: Option<String>,
        attachment: Option<Attachment>,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
        resolved_by: Option<String>,
        resolution_note: Option<String>,
    ) -> AppResult<Self> {
        if let (Some(created), Some(updated)) = (created_at, updated_at)
            && created > updated
        {
            return Err(AppError::Validation(
                "created_at must not be later than updated_at".to_owned(),
            ));
        }

        Ok(Self {
            id,
            title: NonEmptyString::new(title)?,
            description: NonEmptyString::new(description)?,
            category,
            status,
            submitter_email: submitter_email.into(),
            submitter_subject: submitter_subject.into(),
            department,
            attachment,
            created_at,
            updated_at,
            resolved_by,
            resolution_note,
        })
    }

    /// Applies a staff status update: stamps `updated_at` (never earlier
    /// than `created_at`) and records the acting staff member and note.
    pub fn apply_status(
        &mut self,
        status: GrievanceStatus,
        actor_email: impl Into<String>,
        resolution_note: Option<String>,
        now: DateTime<Utc>,
    ) {
        let stamp = self.created_at.map_or(now, |created| now.max(created));
        self.status = status;
        self.updated_at = Some(stamp);
        self.resolved_by = Some(actor_email.into());
        self.resolution_note = resolution_note;
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> GrievanceId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> GrievanceCategory {
        self.category
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> GrievanceStatus {
        self.status
    }

    /// Returns the filer's email. Immutable after creation.
    #[must_use]
    pub fn submitter_email(&self) -> &str {
        self.submitter_email.as_str()
    }

    /// Returns the filer's identity-provider subject id.
    #[must_use]
    pub fn submitter_subject(&self) -> &str {
        self.submitter_subject.as_str()
    }

    /// Returns the optional department tag.
    #[must_use]
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    /// Returns the attachment metadata, if any.
    #[must_use]
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Returns the server-assigned creation time, if acknowledged.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns the last update time, if acknowledged.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns the email of the staff member who last changed the status.
    #[must_use]
    pub fn resolved_by(&self) -> Option<&str> {
        self.resolved_by.as_deref()
    }

    /// Returns the note attached to the last status change.
    #[must_use]
    pub fn resolution_note(&self) -> Option<&str> {
        self.resolution_note.as_deref()
    }
}
