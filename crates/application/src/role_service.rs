//! Role resolution: persisted role records with lexical fallback.

use std::sync::Arc;

use chrono::Utc;
use grievance_core::{AppError, AppResult, UserIdentity};
use grievance_domain::{AccessRole, RoleRecord, derive_role_from_email, validate_provisioning};
use tracing::warn;

use crate::ports::RoleRepository;

/// Application service resolving identities to access roles.
///
/// The single authoritative precedence table lives here; no other call site
/// re-derives roles from email strings.
#[derive(Clone)]
pub struct RoleService {
    repository: Arc<dyn RoleRepository>,
    required_domain: Option<String>,
}

impl RoleService {
    /// Creates a role service without an email-domain policy.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleRepository>) -> Self {
        Self {
            repository,
            required_domain: None,
        }
    }

    /// Creates a role service that enforces an institution email domain at
    /// provisioning time.
    #[must_use]
    pub fn with_required_domain(
        repository: Arc<dyn RoleRepository>,
        required_domain: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            required_domain: Some(required_domain.into()),
        }
    }

    /// Resolves an identity to exactly one role. Never fails.
    ///
    /// A persisted role record is authoritative and is never overridden by
    /// lexical cues. Absent a record, the role derived from the email is
    /// returned immediately and persisted best-effort so later resolutions
    /// hit the record. A store failure falls back to the derived role.
    pub async fn resolve(&self, identity: &UserIdentity) -> AccessRole {
        match self.repository.find_by_subject(identity.subject()).await {
            Ok(Some(record)) => return record.role(),
            Ok(None) => {}
            Err(error) => {
                warn!(
                    %error,
                    subject = identity.subject(),
                    "role lookup failed; deriving role from email"
                );
                return derive_role_from_email(identity.email());
            }
        }

        let derived = derive_role_from_email(identity.email());
        let record = RoleRecord::new(
            identity.subject(),
            identity.email(),
            identity.display_name().map(str::to_owned),
            derived,
            Utc::now(),
        );

        if let Err(error) = self.repository.insert(record).await {
            warn!(
                %error,
                subject = identity.subject(),
                "failed to persist derived role; resolution continues"
            );
        }

        derived
    }

    /// Provisions an explicitly requested role for a new account.
    ///
    /// Applies the email-domain policy and the admin-email rule before any
    /// record write; a subject with an existing record is a conflict.
    pub async fn provision(
        &self,
        identity: &UserIdentity,
        requested: AccessRole,
    ) -> AppResult<RoleRecord> {
        validate_provisioning(identity.email(), requested, self.required_domain.as_deref())?;

        if self
            .repository
            .find_by_subject(identity.subject())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "a role record already exists for subject '{}'",
                identity.subject()
            )));
        }

        let record = RoleRecord::new(
            identity.subject(),
            identity.email(),
            identity.display_name().map(str::to_owned),
            requested,
            Utc::now(),
        );
        self.repository.insert(record.clone()).await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use grievance_core::{AppError, AppResult, UserIdentity};
    use grievance_domain::{AccessRole, RoleRecord};
    use tokio::sync::Mutex;

    use super::RoleService;
    use crate::ports::RoleRepository;

    #[derive(Default)]
    struct FakeRoleRepository {
        records: Mutex<HashMap<String, RoleRecord>>,
        fail_reads: bool,
    }

    #[async_trait]
    impl RoleRepository for FakeRoleRepository {
        async fn find_by_subject(&self, subject: &str) -> AppResult<Option<RoleRecord>> {
            if self.fail_reads {
                return Err(AppError::Store("role store unavailable".to_owned()));
            }

            Ok(self.records.lock().await.get(subject).cloned())
        }

        async fn insert(&self, record: RoleRecord) -> AppResult<()> {
            let mut records = self.records.lock().await;
            if records.contains_key(record.subject()) {
                return Err(AppError::Conflict(format!(
                    "role record for '{}' already exists",
                    record.subject()
                )));
            }

            records.insert(record.subject().to_owned(), record);
            Ok(())
        }
    }

    fn identity(subject: &str, email: &str) -> UserIdentity {
        UserIdentity::new(subject, email, true, None)
    }

    #[tokio::test]
    async fn first_resolution_derives_and_persists() {
        let repository = Arc::new(FakeRoleRepository::default());
        let service = RoleService::new(repository.clone());

        let role = service
            .resolve(&identity("uid-1", "warden@sece.ac.in"))
            .await;
        assert_eq!(role, AccessRole::Warden);

        let stored = repository.records.lock().await.get("uid-1").cloned();
        assert!(stored.is_some());
        assert_eq!(
            stored.map(|record| record.role()),
            Some(AccessRole::Warden)
        );
    }

    #[tokio::test]
    async fn persisted_role_outranks_lexical_cues() {
        let repository = Arc::new(FakeRoleRepository::default());
        let seeded = RoleRecord::new(
            "uid-2",
            "admin@sece.ac.in",
            None,
            AccessRole::Student,
            chrono::Utc::now(),
        );
        let insert = repository.insert(seeded).await;
        assert!(insert.is_ok());

        let service = RoleService::new(repository);
        let role = service.resolve(&identity("uid-2", "admin@sece.ac.in")).await;
        assert_eq!(role, AccessRole::Student);
    }

    #[tokio::test]
    async fn store_failure_falls_back_to_derived_role() {
        let repository = Arc::new(FakeRoleRepository {
            records: Mutex::new(HashMap::new()),
            fail_reads: true,
        });
        let service = RoleService::new(repository);

        let role = service.resolve(&identity("uid-3", "hod.cse@sece.ac.in")).await;
        assert_eq!(role, AccessRole::Hod);
    }

    #[tokio::test]
    async fn plain_email_resolves_to_student() {
        let repository = Arc::new(FakeRoleRepository::default());
        let service = RoleService::new(repository);

        let role = service
            .resolve(&identity("uid-4", "alice.2027@sece.ac.in"))
            .await;
        assert_eq!(role, AccessRole::Student);
    }

    #[tokio::test]
    async fn provisioning_enforces_the_domain_policy() {
        let repository = Arc::new(FakeRoleRepository::default());
        let service = RoleService::with_required_domain(repository, "sece.ac.in");

        let rejected = service
            .provision(&identity("uid-5", "alice@gmail.com"), AccessRole::Student)
            .await;
        assert!(rejected.is_err());

        let accepted = service
            .provision(&identity("uid-5", "alice@sece.ac.in"), AccessRole::Student)
            .await;
        assert!(accepted.is_ok());
    }

    #[tokio::test]
    async fn provisioning_twice_is_a_conflict() {
        let repository = Arc::new(FakeRoleRepository::default());
        let service = RoleService::new(repository);
        let who = identity("uid-6", "bob@sece.ac.in");

        let first = service.provision(&who, AccessRole::Student).await;
        assert!(first.is_ok());

        let second = service.provision(&who, AccessRole::Student).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }
}
