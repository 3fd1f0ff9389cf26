//! Project store.
//!
//! The pipeline reads projects and writes results through [`ProjectStore`]; it has
//! no opinion on the schema beyond that contract. Two implementations ship:
//! SQLite (via `sqlx`, migrated from `migrations/`) and an in-memory store.

mod memory;
pub mod migrations;
mod models;
pub mod pool;
mod sqlite;
mod store;

pub use memory::InMemoryProjectStore;
pub use migrations::run_migrations;
pub use models::{ProjectRecord, ProjectUpdate};
pub use pool::init_db_pool_with_path;
pub use sqlite::SqliteProjectStore;
pub use store::ProjectStore;
