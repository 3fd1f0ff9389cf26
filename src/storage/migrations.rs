//! Project store schema migrations.

use std::path::PathBuf;

use anyhow::Context;
use sqlx::migrate::Migrator;
use sqlx::{Pool, Sqlite};

/// `migrations/` at the crate root.
pub fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

/// Brings the `projects` schema up to date. Safe to call on every start.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), anyhow::Error> {
    let dir = migrations_dir();
    let migrator = Migrator::new(dir.as_path())
        .await
        .with_context(|| format!("loading migrations from {}", dir.display()))?;
    migrator
        .run(pool)
        .await
        .context("applying project store migrations")?;
    log::debug!("Project store schema is current");
    Ok(())
}
