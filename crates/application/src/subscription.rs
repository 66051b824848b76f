//! Live subscriptions over the grievance record set.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use grievance_core::AppResult;
use grievance_domain::{Grievance, GrievanceId};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::GrievanceRepository;

/// Change notification broadcast after a store mutation is acknowledged.
///
/// Notifications are wakeup hints, not payloads: subscribers recompute the
/// full snapshot from the repository, so a missed notification at worst
/// delays convergence by one delivery cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrievanceChange {
    /// A record was inserted.
    Created(GrievanceId),
    /// A record was replaced.
    Updated(GrievanceId),
    /// A record was removed. Subscribers treat this as record removal,
    /// not a status value.
    Deleted(GrievanceId),
}

/// Keywords that mark a category as hostel-related for the warden scope.
const HOSTEL_SCOPE_KEYWORDS: &[&str] = &["hostel", "mess", "room", "accommodation"];

/// Filter predicate registered with a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionScope {
    /// Every record (admin, faculty/HOD dashboards).
    All,
    /// Records filed by one submitter (student dashboard).
    Submitter(String),
    /// Hostel-relevant records (warden dashboard). There is no persisted
    /// department guarantee, so this is a re-filter over the entire record
    /// set: category contains a hostel keyword (case-insensitive) or the
    /// optional department equals "hostel".
    HostelRelated,
}

impl SubscriptionScope {
    /// Returns whether a record falls inside this scope.
    #[must_use]
    pub fn matches(&self, grievance: &Grievance) -> bool {
        match self {
            Self::All => true,
            Self::Submitter(email) => grievance.submitter_email() == email,
            Self::HostelRelated => {
                let category = grievance.category().as_str().to_lowercase();
                let by_category = HOSTEL_SCOPE_KEYWORDS
                    .iter()
                    .any(|keyword| category.contains(keyword));
                let by_department = grievance
                    .department()
                    .is_some_and(|department| department.eq_ignore_ascii_case("hostel"));

                by_category || by_department
            }
        }
    }
}

/// Reads the records currently inside a scope.
pub(crate) async fn scoped_records(
    repository: &Arc<dyn GrievanceRepository>,
    scope: &SubscriptionScope,
) -> AppResult<Vec<Grievance>> {
    let records = match scope {
        SubscriptionScope::Submitter(email) => repository.list_by_submitter(email).await?,
        // The warden scope is deliberately a client-side re-filter over the
        // whole set, not a store-level query.
        SubscriptionScope::All | SubscriptionScope::HostelRelated => {
            repository.list_all().await?
        }
    };

    Ok(records
        .into_iter()
        .filter(|grievance| scope.matches(grievance))
        .collect())
}

/// Token that cancels a subscription from outside the owning task.
///
/// After cancellation any in-flight delivery completes as a no-op.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    live: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Marks the subscription as no longer live.
    pub fn cancel(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    /// Returns whether the subscription is still live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// A standing query against the grievance store.
///
/// Yields the immediate full snapshot of matching records on the first call
/// to [`Self::next_snapshot`], then a fresh snapshot for every subsequent
/// insert, update, or delete, until cancelled or the store is torn down.
pub struct GrievanceSubscription {
    scope: SubscriptionScope,
    repository: Arc<dyn GrievanceRepository>,
    receiver: broadcast::Receiver<GrievanceChange>,
    live: Arc<AtomicBool>,
    pending_initial: bool,
}

impl GrievanceSubscription {
    pub(crate) fn new(
        scope: SubscriptionScope,
        repository: Arc<dyn GrievanceRepository>,
        receiver: broadcast::Receiver<GrievanceChange>,
    ) -> Self {
        Self {
            scope,
            repository,
            receiver,
            live: Arc::new(AtomicBool::new(true)),
            pending_initial: true,
        }
    }

    /// Returns the scope this subscription was registered with.
    #[must_use]
    pub fn scope(&self) -> &SubscriptionScope {
        &self.scope
    }

    /// Returns a token that can cancel this subscription from another task.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        CancellationToken {
            live: Arc::clone(&self.live),
        }
    }

    /// Cancels the subscription. Further deliveries are no-ops.
    pub fn cancel(&mut self) {
        self.live.store(false, Ordering::SeqCst);
    }

    /// Returns whether the subscription is still live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Waits for the next snapshot of the matching record set.
    ///
    /// Returns `Ok(None)` once the subscription is cancelled or the store
    /// is dropped; a wakeup that arrives after cancellation is discarded
    /// rather than delivered to a dead context.
    pub async fn next_snapshot(&mut self) -> AppResult<Option<Vec<Grievance>>> {
        if !self.is_live() {
            return Ok(None);
        }

        if self.pending_initial {
            self.pending_initial = false;
            return Ok(Some(scoped_records(&self.repository, &self.scope).await?));
        }

        match self.receiver.recv().await {
            // Lagged receivers resynchronize from the current record set;
            // snapshots are recomputed, never replayed.
            Ok(_) | Err(RecvError::Lagged(_)) => {
                if !self.is_live() {
                    return Ok(None);
                }

                Ok(Some(scoped_records(&self.repository, &self.scope).await?))
            }
            Err(RecvError::Closed) => Ok(None),
        }
    }
}
