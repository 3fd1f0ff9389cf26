//! SQLite-backed project store.
//!
//! List columns (`manual_urls`, `technologies`) and `screenshot_metadata` are
//! JSON text. `last_screenshot_at` is RFC 3339 text in UTC.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::error_handling::DatabaseError;

use super::migrations::run_migrations;
use super::models::{ProjectRecord, ProjectUpdate};
use super::pool::{init_db_pool_with_path, init_memory_pool};
use super::store::ProjectStore;

const SELECT_COLUMNS: &str = "SELECT id, name, url, github_url, manual_urls, framework, \
     technologies, description, category, image_url, screenshot_strategy, \
     screenshot_metadata, last_screenshot_at FROM projects";

pub struct SqliteProjectStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteProjectStore {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database file and migrates it.
    pub async fn open(db_path: &Path) -> Result<Self, anyhow::Error> {
        let pool = init_db_pool_with_path(db_path).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Migrated in-memory database.
    pub async fn open_in_memory() -> Result<Self, anyhow::Error> {
        let pool = init_memory_pool().await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

fn decode_list(row: &SqliteRow, column: &str) -> Result<Vec<String>, DatabaseError> {
    let raw: Option<String> = row.try_get(column)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => Ok(serde_json::from_str(text)?),
    }
}

fn decode_timestamp(id: &str, raw: Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            warn!("Ignoring unreadable last_screenshot_at {raw:?} on project {id}: {e}");
            None
        }
    }
}

fn record_from_row(row: &SqliteRow) -> Result<ProjectRecord, DatabaseError> {
    let id: String = row.try_get("id")?;
    let metadata: Option<String> = row.try_get("screenshot_metadata")?;
    let screenshot_metadata = match metadata {
        Some(text) if !text.trim().is_empty() => Some(serde_json::from_str(&text)?),
        _ => None,
    };
    let last_screenshot_at = decode_timestamp(&id, row.try_get("last_screenshot_at")?);

    Ok(ProjectRecord {
        name: row.try_get("name")?,
        url: row.try_get("url")?,
        github_url: row.try_get("github_url")?,
        manual_urls: decode_list(row, "manual_urls")?,
        framework: row.try_get("framework")?,
        technologies: decode_list(row, "technologies")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        image_url: row.try_get("image_url")?,
        screenshot_strategy: row.try_get("screenshot_strategy")?,
        screenshot_metadata,
        last_screenshot_at,
        id,
    })
}

#[async_trait]
impl ProjectStore for SqliteProjectStore {
    async fn find(&self, id: &str) -> Result<Option<ProjectRecord>, DatabaseError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn update(
        &self,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<ProjectRecord, DatabaseError> {
        let metadata = update
            .screenshot_metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let result = sqlx::query(
            "UPDATE projects SET \
                 url = COALESCE(?, url), \
                 image_url = COALESCE(?, image_url), \
                 screenshot_strategy = COALESCE(?, screenshot_strategy), \
                 screenshot_metadata = COALESCE(?, screenshot_metadata), \
                 last_screenshot_at = COALESCE(?, last_screenshot_at) \
             WHERE id = ?",
        )
        .bind(update.url.as_deref())
        .bind(update.image_url.as_deref())
        .bind(update.screenshot_strategy.as_deref())
        .bind(metadata)
        .bind(update.last_screenshot_at.map(|t| t.to_rfc3339()))
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(id.to_string()));
        }
        self.find(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<ProjectRecord>, DatabaseError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY rowid"))
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn list_pending(&self) -> Result<Vec<ProjectRecord>, DatabaseError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE image_url IS NULL OR TRIM(image_url) = '' ORDER BY rowid"
        ))
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn insert(&self, record: &ProjectRecord) -> Result<(), DatabaseError> {
        let metadata = record
            .screenshot_metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        sqlx::query(
            "INSERT OR REPLACE INTO projects (id, name, url, github_url, manual_urls, framework, \
                 technologies, description, category, image_url, screenshot_strategy, \
                 screenshot_metadata, last_screenshot_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.url.as_deref())
        .bind(record.github_url.as_deref())
        .bind(serde_json::to_string(&record.manual_urls)?)
        .bind(record.framework.as_deref())
        .bind(serde_json::to_string(&record.technologies)?)
        .bind(record.description.as_deref())
        .bind(record.category.as_deref())
        .bind(record.image_url.as_deref())
        .bind(record.screenshot_strategy.as_deref())
        .bind(metadata)
        .bind(record.last_screenshot_at.map(|t| t.to_rfc3339()))
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }
}
