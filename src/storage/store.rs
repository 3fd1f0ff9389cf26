use async_trait::async_trait;

use crate::error_handling::DatabaseError;

use super::models::{ProjectRecord, ProjectUpdate};

/// Persistence interface the pipeline reads projects from and writes results to.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// `Ok(None)` when no project has this id.
    async fn find(&self, id: &str) -> Result<Option<ProjectRecord>, DatabaseError>;

    /// Applies a partial update and returns the updated record.
    /// Fails with [`DatabaseError::NotFound`] for an unknown id.
    async fn update(&self, id: &str, update: &ProjectUpdate)
        -> Result<ProjectRecord, DatabaseError>;

    /// Every project, in insertion order.
    async fn list_all(&self) -> Result<Vec<ProjectRecord>, DatabaseError>;

    /// Projects without an image, in insertion order.
    async fn list_pending(&self) -> Result<Vec<ProjectRecord>, DatabaseError>;

    /// Inserts a project, replacing any existing one with the same id.
    async fn insert(&self, record: &ProjectRecord) -> Result<(), DatabaseError>;
}
