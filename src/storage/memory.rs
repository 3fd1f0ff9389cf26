//! In-memory project store, used by tests and dry runs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error_handling::DatabaseError;

use super::models::{ProjectRecord, ProjectUpdate};
use super::store::ProjectStore;

#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    records: RwLock<Vec<ProjectRecord>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ProjectRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

fn apply_update(record: &mut ProjectRecord, update: &ProjectUpdate) {
    if let Some(ref url) = update.url {
        record.url = Some(url.clone());
    }
    if let Some(ref image_url) = update.image_url {
        record.image_url = Some(image_url.clone());
    }
    if let Some(ref strategy) = update.screenshot_strategy {
        record.screenshot_strategy = Some(strategy.clone());
    }
    if let Some(ref metadata) = update.screenshot_metadata {
        record.screenshot_metadata = Some(metadata.clone());
    }
    if let Some(at) = update.last_screenshot_at {
        record.last_screenshot_at = Some(at);
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn find(&self, id: &str) -> Result<Option<ProjectRecord>, DatabaseError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn update(
        &self,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<ProjectRecord, DatabaseError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))?;
        apply_update(record, update);
        Ok(record.clone())
    }

    async fn list_all(&self) -> Result<Vec<ProjectRecord>, DatabaseError> {
        Ok(self.records.read().await.clone())
    }

    async fn list_pending(&self) -> Result<Vec<ProjectRecord>, DatabaseError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| !r.has_image()).cloned().collect())
    }

    async fn insert(&self, record: &ProjectRecord) -> Result<(), DatabaseError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }
}
