use std::collections::HashMap;

use async_trait::async_trait;
use grievance_application::RoleRepository;
use grievance_core::{AppError, AppResult};
use grievance_domain::RoleRecord;
use tokio::sync::RwLock;

/// In-memory role-record repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    records: RwLock<HashMap<String, RoleRecord>>,
}

impl InMemoryRoleRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_subject(&self, subject: &str) -> AppResult<Option<RoleRecord>> {
        Ok(self.records.read().await.get(subject).cloned())
    }

    async fn insert(&self, record: RoleRecord) -> AppResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(record.subject()) {
            return Err(AppError::Conflict(format!(
                "role record for subject '{}' already exists",
                record.subject()
            )));
        }

        records.insert(record.subject().to_owned(), record);
        Ok(())
    }
}
