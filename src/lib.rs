//! smart_screenshot library: representative preview images for portfolio projects
//!
//! For each project the pipeline guesses where the project is deployed, tests
//! the candidate URLs in a headless browser, captures the best one and, when no
//! URL can be captured, falls back to a README image, an earlier capture or a
//! generated placeholder. A project always ends up with some image unless even
//! the placeholder cannot be written.
//!
//! # Example
//!
//! ```no_run
//! use smart_screenshot::{run_screenshots, Config, RunResources, Selection};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     db_path: std::path::PathBuf::from("portfolio.db"),
//!     ..Default::default()
//! };
//!
//! let resources = RunResources::init(config).await?;
//! let report = run_screenshots(&resources, &Selection::AllPending, false).await?;
//! println!(
//!     "{} succeeded, {} failed, {} skipped",
//!     report.summary.succeeded, report.summary.failed, report.summary.skipped
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime, and a Chrome or Chromium executable
//! for the production browser backend.

pub mod admin_server;
pub mod browser;
pub mod capture;
pub mod config;
pub mod discovery;
pub mod error_handling;
pub mod fallback;
pub mod initialization;
pub mod models;
pub mod orchestrator;
mod run;
pub mod storage;
pub mod user_agent;
pub mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use models::{PipelineResult, ProjectInput, Strategy, UrlCandidate};
pub use orchestrator::{BulkReport, Pipeline};
pub use run::{print_error_statistics, run_screenshots, RunReport, RunResources, Selection};
