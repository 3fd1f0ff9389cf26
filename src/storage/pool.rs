//! SQLite pool construction for the project store.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::error_handling::DatabaseError;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounded: one pipeline run writes projects back one at a time.
const MAX_FILE_CONNECTIONS: u32 = 4;

/// Opens the project database at `db_path` in WAL mode.
///
/// The file and its parent directory are created when missing; an existing
/// database is opened as is.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<Arc<Pool<Sqlite>>, DatabaseError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            error!("Failed to create {}: {e}", parent.display());
            DatabaseError::FileCreationError(format!("{}: {e}", parent.display()))
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_FILE_CONNECTIONS)
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to open project database {}: {e}", db_path.display());
            DatabaseError::SqlError(e)
        })?;
    debug!("Opened project database {}", db_path.display());

    Ok(Arc::new(pool))
}

/// Single-connection in-memory pool. Every connection to `sqlite::memory:` is
/// its own database, so the pool must never open a second one.
pub async fn init_memory_pool() -> Result<Arc<Pool<Sqlite>>, DatabaseError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    Ok(Arc::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_missing_parent_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("portfolio.db");

        let pool = init_db_pool_with_path(&path).await.unwrap();

        assert!(path.exists());
        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(pool.as_ref())
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
