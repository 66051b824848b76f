//! Grievance lifecycle store: canonical record set, status transitions,
//! and live subscription fan-out.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use chrono::Utc;
use grievance_core::{AppError, AppResult, UserIdentity};
use grievance_domain::{
    AccessRole, Attachment, Grievance, GrievanceId, MAX_ATTACHMENT_BYTES,
};
use tokio::sync::broadcast;
use tracing::info;

use crate::ports::{
    AttachmentStore, AttachmentUpload, GrievanceRepository, StatusUpdateInput,
    SubmitGrievanceInput,
};
use crate::subscription::{
    GrievanceChange, GrievanceSubscription, SubscriptionScope, scoped_records,
};

/// Buffered change notifications per subscriber before lagging kicks in.
/// Laggards recompute the snapshot, so the capacity only bounds memory.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Application service owning the grievance record set.
#[derive(Clone)]
pub struct GrievanceService {
    repository: Arc<dyn GrievanceRepository>,
    attachments: Arc<dyn AttachmentStore>,
    changes: broadcast::Sender<GrievanceChange>,
}

impl GrievanceService {
    /// Creates a new grievance service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn GrievanceRepository>,
        attachments: Arc<dyn AttachmentStore>,
    ) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            repository,
            attachments,
            changes,
        }
    }

    /// Files a new grievance. Students only; the record always starts
    /// `Pending` with the submitter fixed to the caller.
    pub async fn submit(
        &self,
        identity: &UserIdentity,
        role: AccessRole,
        input: SubmitGrievanceInput,
    ) -> AppResult<Grievance> {
        if role != AccessRole::Student {
            return Err(AppError::Forbidden(
                "only students may file grievances".to_owned(),
            ));
        }

        let now = Utc::now();
        let attachment = match input.attachment {
            Some(upload) => Some(self.upload_attachment(identity, upload, now).await?),
            None => None,
        };

        let grievance = Grievance::submitted(
            input.title,
            input.description,
            input.category,
            identity.email(),
            identity.subject(),
            input.department,
            attachment,
            now,
        )?;

        self.repository.insert(grievance.clone()).await?;
        let _ = self.changes.send(GrievanceChange::Created(grievance.id()));

        info!(id = %grievance.id(), submitter = identity.email(), "grievance filed");
        Ok(grievance)
    }

    /// Validates and uploads attachment bytes. The size check runs before
    /// any blob-store write is attempted.
    async fn upload_attachment(
        &self,
        identity: &UserIdentity,
        upload: AttachmentUpload,
        now: chrono::DateTime<Utc>,
    ) -> AppResult<Attachment> {
        let size_bytes = upload.bytes.len() as u64;
        if size_bytes > MAX_ATTACHMENT_BYTES {
            return Err(AppError::Validation(format!(
                "attachment exceeds the {MAX_ATTACHMENT_BYTES}-byte limit ({size_bytes} bytes)"
            )));
        }

        let path = format!(
            "grievances/{}/{}_{}",
            identity.subject(),
            now.timestamp_millis(),
            upload.file_name
        );
        let url = self
            .attachments
            .upload(&path, &upload.content_type, &upload.bytes)
            .await?;

        Attachment::new(url, upload.file_name, upload.content_type, size_bytes, path)
    }

    /// Applies a status update. Staff roles only; any of the four statuses
    /// is reachable from any other. Concurrent updates are not reconciled;
    /// the store's last write wins.
    pub async fn update_status(
        &self,
        identity: &UserIdentity,
        role: AccessRole,
        id: GrievanceId,
        input: StatusUpdateInput,
    ) -> AppResult<Grievance> {
        if !role.is_staff() {
            return Err(AppError::Forbidden(
                "students may not change grievance status".to_owned(),
            ));
        }

        let mut grievance = self
            .repository
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("grievance '{id}' does not exist")))?;

        grievance.apply_status(
            input.status,
            identity.email(),
            input.resolution_note,
            Utc::now(),
        );
        self.repository.replace(grievance.clone()).await?;
        let _ = self.changes.send(GrievanceChange::Updated(id));

        info!(
            %id,
            status = grievance.status().as_str(),
            actor = identity.email(),
            "grievance status updated"
        );
        Ok(grievance)
    }

    /// Removes a grievance record. Admins only; irreversible. Subscribers
    /// observe the removal on their next snapshot.
    pub async fn delete(
        &self,
        identity: &UserIdentity,
        role: AccessRole,
        id: GrievanceId,
    ) -> AppResult<()> {
        if role != AccessRole::Admin {
            return Err(AppError::Forbidden(
                "only admins may delete grievances".to_owned(),
            ));
        }

        self.repository.delete(id).await?;
        let _ = self.changes.send(GrievanceChange::Deleted(id));

        info!(%id, actor = identity.email(), "grievance deleted");
        Ok(())
    }

    /// Looks up a single grievance by identifier.
    pub async fn find(&self, id: GrievanceId) -> AppResult<Option<Grievance>> {
        self.repository.find(id).await
    }

    /// Reads the records currently inside a scope, one-shot.
    pub async fn list(&self, scope: &SubscriptionScope) -> AppResult<Vec<Grievance>> {
        scoped_records(&self.repository, scope).await
    }

    /// Registers a live subscription for a scope. The first call to
    /// [`GrievanceSubscription::next_snapshot`] yields the immediate full
    /// snapshot; every acknowledged mutation afterwards yields a fresh one.
    #[must_use]
    pub fn subscribe(&self, scope: SubscriptionScope) -> GrievanceSubscription {
        GrievanceSubscription::new(scope, Arc::clone(&self.repository), self.changes.subscribe())
    }
}
