//! Cached screenshot lookup tier.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::config::{Config, SCREENSHOT_SUBDIR};
use crate::error_handling::FallbackError;
use crate::models::{FallbackImage, FallbackKind};
use crate::utils::sanitize::parse_timestamped_filename;

use super::{FallbackRequest, FallbackStrategy};

/// Confidence reported for a reused capture.
const CACHED_CONFIDENCE: u8 = 70;

/// Newest `{stem}-{timestamp}.{ext}` file for `project_name` in `dir`.
///
/// A missing directory is a miss, not an error.
pub async fn find_latest_screenshot(
    dir: &Path,
    project_name: &str,
) -> Result<Option<(String, i64)>, FallbackError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut latest: Option<(String, i64)> = None;
    while let Some(entry) = entries.next_entry().await? {
        let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if let Some(timestamp) = parse_timestamped_filename(&filename, project_name) {
            if latest.as_ref().map_or(true, |(_, t)| timestamp > *t) {
                latest = Some((filename, timestamp));
            }
        }
    }
    Ok(latest)
}

/// Fallback tier that reuses the newest screenshot from an earlier run.
pub struct CachedScreenshotStrategy {
    config: Arc<Config>,
}

impl CachedScreenshotStrategy {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn dir(&self) -> PathBuf {
        self.config.screenshot_dir()
    }
}

#[async_trait]
impl FallbackStrategy for CachedScreenshotStrategy {
    fn kind(&self) -> FallbackKind {
        FallbackKind::CachedScreenshot
    }

    async fn attempt(
        &self,
        request: &FallbackRequest,
    ) -> Result<Option<FallbackImage>, FallbackError> {
        let found = find_latest_screenshot(&self.dir(), &request.project_name).await?;
        Ok(found.map(|(filename, timestamp)| {
            debug!("Reusing cached screenshot {filename}");
            FallbackImage {
                kind: FallbackKind::CachedScreenshot,
                location: self.config.public_path(SCREENSHOT_SUBDIR, &filename),
                source: format!("capture from {timestamp}"),
                confidence: CACHED_CONFIDENCE,
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_directory_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let found = find_latest_screenshot(&dir.path().join("nope"), "Shop")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_picks_newest_matching_file() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "shop-1000.jpg",
            "shop-3000.jpg",
            "shop-2000.jpg",
            "shop-admin-9000.jpg",
            "other-9999.jpg",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let found = find_latest_screenshot(dir.path(), "Shop").await.unwrap();
        assert_eq!(found, Some(("shop-3000.jpg".to_string(), 3000)));
    }

    #[tokio::test]
    async fn test_strategy_returns_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(Config {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        std::fs::create_dir_all(config.screenshot_dir()).unwrap();
        std::fs::write(config.screenshot_dir().join("my-app-42.jpg"), b"x").unwrap();

        let strategy = CachedScreenshotStrategy::new(config);
        let image = strategy
            .attempt(&FallbackRequest::new("My App"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(image.kind, FallbackKind::CachedScreenshot);
        assert_eq!(image.location, "/screenshots/my-app-42.jpg");
    }
}
