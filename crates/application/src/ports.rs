//! Ports to the external record store and blob store.

use async_trait::async_trait;
use grievance_core::AppResult;
use grievance_domain::{Grievance, GrievanceCategory, GrievanceId, GrievanceStatus, RoleRecord};

/// Repository port for grievance persistence.
///
/// The store is the single shared mutable resource; mutations are
/// whole-document replaces with last-write-wins semantics. Live change
/// propagation is owned by [`crate::GrievanceService`], not the repository.
#[async_trait]
pub trait GrievanceRepository: Send + Sync {
    /// Inserts a new grievance record.
    async fn insert(&self, grievance: Grievance) -> AppResult<()>;

    /// Replaces an existing grievance record wholesale.
    async fn replace(&self, grievance: Grievance) -> AppResult<()>;

    /// Removes a grievance record. Irreversible.
    async fn delete(&self, id: GrievanceId) -> AppResult<()>;

    /// Looks up a single grievance by identifier.
    async fn find(&self, id: GrievanceId) -> AppResult<Option<Grievance>>;

    /// Returns every grievance record. Delivery order is unspecified;
    /// consumers sort via the projector.
    async fn list_all(&self) -> AppResult<Vec<Grievance>>;

    /// Returns the grievances filed by a submitter (exact email match).
    async fn list_by_submitter(&self, submitter_email: &str) -> AppResult<Vec<Grievance>>;
}

/// Repository port for persisted role records.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds the role record for an identity-provider subject.
    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<RoleRecord>>;

    /// Inserts a role record. At most one per subject; a duplicate insert
    /// is a conflict.
    async fn insert(&self, record: RoleRecord) -> AppResult<()>;
}

/// Blob-store port for attachment bytes.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Stores the bytes under the given path and returns a retrievable URL.
    async fn upload(&self, path: &str, content_type: &str, bytes: &[u8]) -> AppResult<String>;
}

/// Attachment bytes accompanying a submission, not yet uploaded.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    /// Original file name.
    pub file_name: String,
    /// MIME content type.
    pub content_type: String,
    /// Raw file bytes. Size-checked before any blob-store write.
    pub bytes: Vec<u8>,
}

/// Parameters for filing a new grievance.
#[derive(Debug, Clone)]
pub struct SubmitGrievanceInput {
    /// Short summary of the complaint.
    pub title: String,
    /// Full description of the complaint.
    pub description: String,
    /// Chosen category (possibly overriding the classifier suggestion).
    pub category: GrievanceCategory,
    /// Optional department tag consulted by the warden scope.
    pub department: Option<String>,
    /// Optional attachment bytes.
    pub attachment: Option<AttachmentUpload>,
}

/// Parameters for a staff status update.
#[derive(Debug, Clone)]
pub struct StatusUpdateInput {
    /// New status value.
    pub status: GrievanceStatus,
    /// Optional note recorded with the change.
    pub resolution_note: Option<String>,
}
