//! Retrying capture attempts against the shared browser session.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::select_ok;
use log::{debug, info, warn};

use crate::browser::scripts::{content_inspection, suppress_overlays, ContentInspection, ReadinessCheck};
use crate::browser::{
    close_quietly, BrowserPage, BrowserSession, ImageFormat, PageSetup, RequestFilter,
    ScreenshotRequest,
};
use crate::config::{Config, READINESS_POLL_INTERVAL, SCREENSHOT_QUALITY, SCREENSHOT_SUBDIR};
use crate::error_handling::{categorize_capture_error, CaptureError, PipelineStats};
use crate::models::{CaptureMetadata, ScreenshotResult};
use crate::utils::sanitize::{sanitize_and_truncate_error_message, timestamped_filename};
use crate::utils::{elapsed_ms, RetryPolicy};

use super::{compute_capture_region, CaptureOptions};

/// Captures screenshots of vetted URLs.
///
/// Every attempt runs in its own tab, which is closed on every path; a failed
/// attempt is retried after the configured backoff.
pub struct CaptureEngine {
    session: Arc<dyn BrowserSession>,
    config: Arc<Config>,
    stats: Arc<PipelineStats>,
}

struct Captured {
    image_path: String,
    metadata: CaptureMetadata,
}

impl CaptureEngine {
    pub fn new(
        session: Arc<dyn BrowserSession>,
        config: Arc<Config>,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            session,
            config,
            stats,
        }
    }

    /// Captures `url`, retrying up to `options.retry_count` more times.
    ///
    /// Never fails: the last error is reported in the result, and `attempts`
    /// counts every try.
    pub async fn capture(
        &self,
        url: &str,
        project_name: &str,
        options: &CaptureOptions,
    ) -> ScreenshotResult {
        let policy = RetryPolicy::new(options.retry_count, self.config.retry_backoff());
        let max_attempts = policy.max_attempts();

        let outcome = policy
            .run(|attempt| async move {
                info!("Capturing {url} (attempt {attempt}/{max_attempts})");
                let result = self.attempt(url, project_name, options).await;
                if let Err(ref e) = result {
                    warn!("Capture attempt {attempt}/{max_attempts} for {url} failed: {e}");
                    self.stats.increment_error(categorize_capture_error(e));
                }
                result
            })
            .await;

        match outcome.result {
            Ok(captured) => {
                info!(
                    "Captured {url} as {} after {} attempt(s)",
                    captured.image_path, outcome.attempts
                );
                ScreenshotResult {
                    success: true,
                    image_path: Some(captured.image_path),
                    metadata: captured.metadata,
                    attempts: outcome.attempts,
                    error: None,
                }
            }
            Err(e) => ScreenshotResult {
                success: false,
                image_path: None,
                metadata: CaptureMetadata {
                    source_url: url.to_string(),
                    ..Default::default()
                },
                attempts: outcome.attempts,
                error: Some(sanitize_and_truncate_error_message(&e.to_string())),
            },
        }
    }

    async fn attempt(
        &self,
        url: &str,
        project_name: &str,
        options: &CaptureOptions,
    ) -> Result<Captured, CaptureError> {
        let setup = PageSetup {
            viewport: options.device.viewport(),
            user_agent: options.device.user_agent(),
            request_filter: Some(RequestFilter::capture(
                &self.config.patterns.image_allow_hints,
            )),
        };

        let page = self.session.new_page(&setup).await?;
        let result = self
            .capture_on_page(page.as_ref(), url, project_name, options)
            .await;
        close_quietly(page).await;
        result
    }

    async fn capture_on_page(
        &self,
        page: &dyn BrowserPage,
        url: &str,
        project_name: &str,
        options: &CaptureOptions,
    ) -> Result<Captured, CaptureError> {
        let start = Instant::now();
        let response = page.navigate(url, options.max_wait).await?;
        match response.status {
            Some(200) => {}
            Some(status) => {
                return Err(CaptureError::BadStatus {
                    url: url.to_string(),
                    status,
                })
            }
            None => return Err(CaptureError::NoResponse(url.to_string())),
        }
        let load_time_ms = elapsed_ms(start);

        self.wait_until_ready(page).await;
        pause(self.config.base_delay()).await;

        let inspection: ContentInspection = serde_json::from_value(
            page.evaluate(&content_inspection(&self.config.patterns))
                .await?,
        )
        .unwrap_or_default();

        if options.suppress_overlays {
            match page.evaluate(&suppress_overlays(&self.config.patterns)).await {
                Ok(hidden) => debug!("Hid {} overlay element(s) on {url}", hidden),
                Err(e) => debug!("Overlay suppression failed on {url}: {e}"),
            }
        }

        let viewport = options.device.viewport();
        let region = compute_capture_region(inspection.hero, &viewport, options);
        let (width, height) = if options.full_page {
            (viewport.width, viewport.height)
        } else {
            (region.width.round() as u32, region.height.round() as u32)
        };

        pause(self.config.settle_delay()).await;

        let request = ScreenshotRequest {
            format: ImageFormat::Jpeg,
            quality: SCREENSHOT_QUALITY,
            full_page: options.full_page,
            clip: (!options.full_page).then_some(region),
        };
        let bytes = page.screenshot(&request).await?;
        let image_path = self.persist(project_name, &bytes, request.format).await?;

        let title = page
            .evaluate("document.title")
            .await
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|t| !t.is_empty());

        Ok(Captured {
            image_path,
            metadata: CaptureMetadata {
                source_url: url.to_string(),
                final_url: Some(response.final_url),
                title,
                load_time_ms,
                has_content: inspection.has_content,
                has_hero: inspection.has_hero,
                width,
                height,
            },
        })
    }

    /// Races the readiness checks; returns when one holds or all time out.
    async fn wait_until_ready(&self, page: &dyn BrowserPage) {
        let timeout = self.config.readiness_timeout();
        if timeout.is_zero() {
            return;
        }

        let checks = ReadinessCheck::ALL
            .iter()
            .map(|check| Box::pin(self.poll_check(page, *check, timeout)));
        match select_ok(checks).await {
            Ok((name, _)) => debug!("Page ready: {name}"),
            Err(_) => debug!("No readiness signal within {timeout:?}"),
        }
    }

    async fn poll_check(
        &self,
        page: &dyn BrowserPage,
        check: ReadinessCheck,
        timeout: Duration,
    ) -> Result<&'static str, tokio::time::error::Elapsed> {
        let script = check.script(&self.config.patterns);
        let poll = async {
            loop {
                if let Ok(serde_json::Value::Bool(true)) = page.evaluate(&script).await {
                    return check.name();
                }
                tokio::time::sleep(READINESS_POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, poll).await
    }

    async fn persist(
        &self,
        project_name: &str,
        bytes: &[u8],
        format: ImageFormat,
    ) -> Result<String, CaptureError> {
        let dir = self.config.screenshot_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let filename = timestamped_filename(
            project_name,
            Utc::now().timestamp_millis(),
            format.extension(),
        );
        tokio::fs::write(dir.join(&filename), bytes).await?;
        Ok(self.config.public_path(SCREENSHOT_SUBDIR, &filename))
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
