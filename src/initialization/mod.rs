//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger
//! - HTTP client for source-repository calls
//! - Output directories for screenshots and placeholders

mod client;
mod logger;

use crate::config::Config;
use crate::error_handling::InitializationError;

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;

/// Creates the screenshot and placeholder directories below the output root.
pub async fn init_output_dirs(config: &Config) -> Result<(), InitializationError> {
    tokio::fs::create_dir_all(config.screenshot_dir()).await?;
    tokio::fs::create_dir_all(config.placeholder_dir()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_output_dirs_creates_tree() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_dir: dir.path().join("public"),
            ..Default::default()
        };
        init_output_dirs(&config).await.unwrap();
        assert!(config.screenshot_dir().is_dir());
        assert!(config.placeholder_dir().is_dir());
    }
}
