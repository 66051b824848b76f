use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use grievance_core::{AppError, AppResult, UserIdentity};
use grievance_domain::{AccessRole, Grievance, GrievanceCategory, GrievanceId, GrievanceStatus};
use tokio::sync::{Mutex, RwLock};

use super::GrievanceService;
use crate::ports::{
    AttachmentStore, AttachmentUpload, GrievanceRepository, StatusUpdateInput,
    SubmitGrievanceInput,
};
use crate::subscription::SubscriptionScope;

#[derive(Default)]
struct FakeGrievanceRepository {
    records: RwLock<HashMap<GrievanceId, Grievance>>,
}

#[async_trait]
impl GrievanceRepository for FakeGrievanceRepository {
    async fn insert(&self, grievance: Grievance) -> AppResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&grievance.id()) {
            return Err(AppError::Conflict(format!(
                "grievance '{}' already exists",
                grievance.id()
            )));
        }

        records.insert(grievance.id(), grievance);
        Ok(())
    }

    async fn replace(&self, grievance: Grievance) -> AppResult<()> {
        let mut records = self.records.write().await;
        if !records.contains_key(&grievance.id()) {
            return Err(AppError::NotFound(format!(
                "grievance '{}' does not exist",
                grievance.id()
            )));
        }

        records.insert(grievance.id(), grievance);
        Ok(())
    }

    async fn delete(&self, id: GrievanceId) -> AppResult<()> {
        if self.records.write().await.remove(&id).is_none() {
            return Err(AppError::NotFound(format!(
                "grievance '{id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn find(&self, id: GrievanceId) -> AppResult<Option<Grievance>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Grievance>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn list_by_submitter(&self, submitter_email: &str) -> AppResult<Vec<Grievance>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|grievance| grievance.submitter_email() == submitter_email)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeAttachmentStore {
    uploads: Mutex<Vec<String>>,
}

impl FakeAttachmentStore {
    async fn upload_count(&self) -> usize {
        self.uploads.lock().await.len()
    }
}

#[async_trait]
impl AttachmentStore for FakeAttachmentStore {
    async fn upload(&self, path: &str, _content_type: &str, _bytes: &[u8]) -> AppResult<String> {
        self.uploads.lock().await.push(path.to_owned());
        Ok(format!("memory://{path}"))
    }
}

fn service_with_fakes() -> (GrievanceService, Arc<FakeAttachmentStore>) {
    let attachments = Arc::new(FakeAttachmentStore::default());
    let service = GrievanceService::new(
        Arc::new(FakeGrievanceRepository::default()),
        attachments.clone(),
    );

    (service, attachments)
}

fn student() -> UserIdentity {
    UserIdentity::new("uid-alice", "alice@sece.ac.in", true, Some("Alice".to_owned()))
}

fn warden() -> UserIdentity {
    UserIdentity::new("uid-warden", "warden@sece.ac.in", true, None)
}

fn admin() -> UserIdentity {
    UserIdentity::new("uid-admin", "admin@sece.ac.in", true, None)
}

fn submission(title: &str, category: GrievanceCategory) -> SubmitGrievanceInput {
    SubmitGrievanceInput {
        title: title.to_owned(),
        description: "it has been broken for a while".to_owned(),
        category,
        department: None,
        attachment: None,
    }
}

#[tokio::test]
async fn student_submission_starts_pending() {
    let (service, _) = service_with_fakes();

    let grievance = service
        .submit(
            &student(),
            AccessRole::Student,
            submission("Water cooler broken", GrievanceCategory::Infrastructure),
        )
        .await;
    assert!(grievance.is_ok());

    let grievance = grievance.unwrap_or_else(|_| unreachable!());
    assert_eq!(grievance.status(), GrievanceStatus::Pending);
    assert_eq!(grievance.submitter_email(), "alice@sece.ac.in");
    assert!(grievance.created_at().is_some());
}

#[tokio::test]
async fn staff_roles_may_not_submit() {
    let (service, _) = service_with_fakes();

    let result = service
        .submit(
            &warden(),
            AccessRole::Warden,
            submission("not a student complaint", GrievanceCategory::Hostel),
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn status_updates_are_staff_only_and_stamp_metadata() {
    let (service, _) = service_with_fakes();
    let filed = service
        .submit(
            &student(),
            AccessRole::Student,
            submission("No water in hostel mess", GrievanceCategory::Hostel),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let denied = service
        .update_status(
            &student(),
            AccessRole::Student,
            filed.id(),
            StatusUpdateInput {
                status: GrievanceStatus::Resolved,
                resolution_note: None,
            },
        )
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let updated = service
        .update_status(
            &warden(),
            AccessRole::Warden,
            filed.id(),
            StatusUpdateInput {
                status: GrievanceStatus::InProgress,
                resolution_note: Some("plumber scheduled".to_owned()),
            },
        )
        .await;
    assert!(updated.is_ok());

    let updated = updated.unwrap_or_else(|_| unreachable!());
    assert_eq!(updated.status(), GrievanceStatus::InProgress);
    assert_eq!(updated.resolved_by(), Some("warden@sece.ac.in"));
    assert_eq!(updated.resolution_note(), Some("plumber scheduled"));
    assert!(updated.created_at() <= updated.updated_at());
}

#[tokio::test]
async fn updating_a_missing_record_is_not_found() {
    let (service, _) = service_with_fakes();

    let result = service
        .update_status(
            &admin(),
            AccessRole::Admin,
            GrievanceId::new(),
            StatusUpdateInput {
                status: GrievanceStatus::Escalated,
                resolution_note: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn deletion_is_admin_only() {
    let (service, _) = service_with_fakes();
    let filed = service
        .submit(
            &student(),
            AccessRole::Student,
            submission("Late bus", GrievanceCategory::Transport),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let denied = service
        .delete(&warden(), AccessRole::Warden, filed.id())
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let deleted = service.delete(&admin(), AccessRole::Admin, filed.id()).await;
    assert!(deleted.is_ok());

    let found = service.find(filed.id()).await;
    assert!(found.is_ok());
    assert!(found.unwrap_or(None).is_none());
}

#[tokio::test]
async fn oversized_attachment_is_rejected_before_any_upload() {
    let (service, attachments) = service_with_fakes();

    let result = service
        .submit(
            &student(),
            AccessRole::Student,
            SubmitGrievanceInput {
                title: "photo evidence".to_owned(),
                description: "see attachment".to_owned(),
                category: GrievanceCategory::Infrastructure,
                department: None,
                attachment: Some(AttachmentUpload {
                    file_name: "photo.png".to_owned(),
                    content_type: "image/png".to_owned(),
                    bytes: vec![0_u8; 600 * 1024],
                }),
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    // The blob store was never touched.
    assert_eq!(attachments.upload_count().await, 0);
}

#[tokio::test]
async fn valid_attachment_is_uploaded_and_linked() {
    let (service, attachments) = service_with_fakes();

    let grievance = service
        .submit(
            &student(),
            AccessRole::Student,
            SubmitGrievanceInput {
                title: "photo evidence".to_owned(),
                description: "see attachment".to_owned(),
                category: GrievanceCategory::Infrastructure,
                department: None,
                attachment: Some(AttachmentUpload {
                    file_name: "photo.png".to_owned(),
                    content_type: "image/png".to_owned(),
                    bytes: vec![0_u8; 64 * 1024],
                }),
            },
        )
        .await;
    assert!(grievance.is_ok());

    let grievance = grievance.unwrap_or_else(|_| unreachable!());
    let attachment = grievance.attachment();
    assert!(attachment.is_some());

    let attachment = attachment.unwrap_or_else(|| unreachable!());
    assert!(attachment.url().starts_with("memory://grievances/uid-alice/"));
    assert_eq!(attachment.size_bytes(), 64 * 1024);
    assert_eq!(attachments.upload_count().await, 1);
}

#[tokio::test]
async fn subscribers_converge_after_an_admin_delete() {
    let (service, _) = service_with_fakes();
    let mut admin_view = service.subscribe(SubscriptionScope::All);
    let mut student_view =
        service.subscribe(SubscriptionScope::Submitter("alice@sece.ac.in".to_owned()));

    // Immediate full snapshots of the (empty) matching set.
    let initial = admin_view.next_snapshot().await;
    assert!(initial.is_ok());
    assert_eq!(initial.unwrap_or(None).map(|records| records.len()), Some(0));
    let initial = student_view.next_snapshot().await;
    assert!(initial.is_ok());
    assert_eq!(initial.unwrap_or(None).map(|records| records.len()), Some(0));

    let kept = service
        .submit(
            &student(),
            AccessRole::Student,
            submission("Projector flickers", GrievanceCategory::Infrastructure),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let doomed = service
        .submit(
            &student(),
            AccessRole::Student,
            submission("Wrong fee receipt", GrievanceCategory::Administrative),
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    // Drain both creation deliveries.
    for view in [&mut admin_view, &mut student_view] {
        let _ = view.next_snapshot().await;
        let snapshot = view.next_snapshot().await;
        assert!(snapshot.is_ok());
        assert_eq!(
            snapshot.unwrap_or(None).map(|records| records.len()),
            Some(2)
        );
    }

    let deleted = service.delete(&admin(), AccessRole::Admin, doomed.id()).await;
    assert!(deleted.is_ok());

    // Both live subscribers converge to a set excluding the deleted record
    // within one delivery cycle.
    for view in [&mut admin_view, &mut student_view] {
        let snapshot = view.next_snapshot().await;
        assert!(snapshot.is_ok());
        let records = snapshot.unwrap_or(None).unwrap_or_default();
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|record| record.id() == kept.id()));
    }
}

#[tokio::test]
async fn warden_scope_matches_hostel_related_records_only() {
    let (service, _) = service_with_fakes();

    let transport = service
        .submit(
            &student(),
            AccessRole::Student,
            submission("Late bus", GrievanceCategory::Transport),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let hostel = service
        .submit(
            &student(),
            AccessRole::Student,
            submission("Leaking tap", GrievanceCategory::Hostel),
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let tagged = service
        .submit(
            &student(),
            AccessRole::Student,
            SubmitGrievanceInput {
                department: Some("Hostel".to_owned()),
                ..submission("Noise at night", GrievanceCategory::Administrative)
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let mut warden_view = service.subscribe(SubscriptionScope::HostelRelated);
    let snapshot = warden_view.next_snapshot().await;
    assert!(snapshot.is_ok());

    let records = snapshot.unwrap_or(None).unwrap_or_default();
    let ids: Vec<GrievanceId> = records.iter().map(Grievance::id).collect();
    assert!(ids.contains(&hostel.id()));
    assert!(ids.contains(&tagged.id()));
    assert!(!ids.contains(&transport.id()));
}

#[tokio::test]
async fn cancelled_subscription_never_delivers_again() {
    let (service, _) = service_with_fakes();
    let mut view = service.subscribe(SubscriptionScope::All);

    let initial = view.next_snapshot().await;
    assert!(initial.is_ok());

    let token = view.cancellation_token();
    token.cancel();
    assert!(!view.is_live());

    // A mutation after cancellation must not reach the dead context.
    let filed = service
        .submit(
            &student(),
            AccessRole::Student,
            submission("after teardown", GrievanceCategory::Library),
        )
        .await;
    assert!(filed.is_ok());

    let delivery = view.next_snapshot().await;
    assert!(delivery.is_ok());
    assert!(delivery.unwrap_or(Some(Vec::new())).is_none());
}

#[tokio::test]
async fn subscription_ends_when_the_store_is_dropped() {
    let (service, _) = service_with_fakes();
    let mut view = service.subscribe(SubscriptionScope::All);

    let initial = view.next_snapshot().await;
    assert!(initial.is_ok());

    drop(service);

    let delivery = view.next_snapshot().await;
    assert!(delivery.is_ok());
    assert!(delivery.unwrap_or(Some(Vec::new())).is_none());
}
