use std::collections::HashMap;

use async_trait::async_trait;
use grievance_application::GrievanceRepository;
use grievance_core::{AppError, AppResult};
use grievance_domain::{Grievance, GrievanceId};
use tokio::sync::RwLock;

/// In-memory grievance repository implementation.
///
/// Backs development mode and test doubles; delivery order of listings is
/// map-iteration order and deliberately not a sort guarantee.
#[derive(Debug, Default)]
pub struct InMemoryGrievanceRepository {
    records: RwLock<HashMap<GrievanceId, Grievance>>,
}

impl InMemoryGrievanceRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl GrievanceRepository for InMemoryGrievanceRepository {
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
