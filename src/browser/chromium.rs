//! Chromium backend over the DevTools protocol (`chromiumoxide`).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, Viewport as CdpViewport,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{
    BrowserPage, BrowserSession, FilterDecision, ImageFormat, NavigationResponse, PageSetup,
    RequestFilter, ResourceKind, ScreenshotRequest,
};
use crate::error_handling::BrowserError;

/// A lazily launched headless Chromium shared by every tab of a run.
///
/// The process starts on the first [`BrowserSession::new_page`] call and stops on
/// [`BrowserSession::close`].
pub struct ChromiumSession {
    chrome_path: Option<PathBuf>,
    running: Mutex<Option<RunningBrowser>>,
}

struct RunningBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self {
            chrome_path,
            running: Mutex::new(None),
        }
    }

    async fn launch(&self) -> Result<RunningBrowser, BrowserError> {
        info!("Launching headless browser");

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--mute-audio")
            .arg("--hide-scrollbars")
            .arg("--disable-blink-features=AutomationControlled");

        if let Some(ref path) = self.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(BrowserError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {e}");
                }
            }
        });

        Ok(RunningBrowser { browser, handler })
    }

    async fn configure(page: &Page, setup: &PageSetup) -> Result<Option<JoinHandle<()>>, BrowserError> {
        page.execute(SetUserAgentOverrideParams::new(setup.user_agent.clone()))
            .await
            .map_err(protocol_error)?;

        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(setup.viewport.width),
            i64::from(setup.viewport.height),
            setup.viewport.device_scale_factor,
            setup.viewport.mobile,
        ))
        .await
        .map_err(protocol_error)?;

        match setup.request_filter.clone() {
            Some(filter) => Ok(Some(install_request_filter(page, filter).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&self, setup: &PageSetup) -> Result<Box<dyn BrowserPage>, BrowserError> {
        let page = {
            let mut running = self.running.lock().await;
            if running.is_none() {
                *running = Some(self.launch().await?);
            }
            let running = running.as_ref().ok_or(BrowserError::SessionClosed)?;
            running
                .browser
                .new_page("about:blank")
                .await
                .map_err(protocol_error)?
        };

        match Self::configure(&page, setup).await {
            Ok(interceptor) => Ok(Box::new(ChromiumPage { page, interceptor })),
            Err(e) => {
                let _ = page.close().await;
                Err(e)
            }
        }
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let Some(mut running) = self.running.lock().await.take() else {
            return Ok(());
        };

        let result = running.browser.close().await.map(|_| ());
        if let Err(ref e) = result {
            warn!("Failed to close browser cleanly: {e}");
        }
        let _ = running.browser.wait().await;
        running.handler.abort();
        info!("Headless browser shut down");
        result.map_err(protocol_error)
    }
}

/// Routes every request through `filter` via the Fetch domain.
async fn install_request_filter(
    page: &Page,
    filter: RequestFilter,
) -> Result<JoinHandle<()>, BrowserError> {
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(protocol_error)?;
    page.execute(EnableParams::builder().build())
        .await
        .map_err(protocol_error)?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let kind = resource_kind(&event.resource_type);
            let outcome = match filter.decide(kind, &event.request.url) {
                FilterDecision::Continue => page
                    .execute(ContinueRequestParams::new(event.request_id.clone()))
                    .await
                    .map(|_| ()),
                FilterDecision::Abort => page
                    .execute(FailRequestParams::new(
                        event.request_id.clone(),
                        ErrorReason::BlockedByClient,
                    ))
                    .await
                    .map(|_| ()),
            };
            if let Err(e) = outcome {
                debug!("Request interception failed for {}: {e}", event.request.url);
            }
        }
    }))
}

fn resource_kind(resource_type: &ResourceType) -> ResourceKind {
    match resource_type {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Stylesheet => ResourceKind::Stylesheet,
        ResourceType::Script => ResourceKind::Script,
        ResourceType::Xhr => ResourceKind::Xhr,
        ResourceType::Fetch => ResourceKind::Fetch,
        ResourceType::Image => ResourceKind::Image,
        ResourceType::Media => ResourceKind::Media,
        ResourceType::Font => ResourceKind::Font,
        _ => ResourceKind::Other,
    }
}

fn protocol_error(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::Protocol(e.to_string())
}

struct ChromiumPage {
    page: Page,
    interceptor: Option<JoinHandle<()>>,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn navigate(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<NavigationResponse, BrowserError> {
        let navigation = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation_response().await
        };

        let request = match tokio::time::timeout(timeout, navigation).await {
            Ok(Ok(request)) => request,
            Ok(Err(e)) => {
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(BrowserError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_secs: timeout.as_secs(),
                })
            }
        };

        let response = request.as_ref().and_then(|r| r.response.as_ref());
        let status = response.and_then(|r| u16::try_from(r.status).ok());
        let final_url = match self.page.url().await {
            Ok(Some(current)) => current,
            _ => response
                .map(|r| r.url.clone())
                .unwrap_or_else(|| url.to_string()),
        };

        Ok(NavigationResponse { status, final_url })
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(BrowserError::Evaluation)?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        Ok(result
            .into_value::<serde_json::Value>()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn screenshot(&self, request: &ScreenshotRequest) -> Result<Vec<u8>, BrowserError> {
        let mut builder = ScreenshotParams::builder().full_page(request.full_page);
        builder = match request.format {
            ImageFormat::Jpeg => builder
                .format(CaptureScreenshotFormat::Jpeg)
                .quality(i64::from(request.quality)),
            ImageFormat::Png => builder.format(CaptureScreenshotFormat::Png),
        };
        if let (false, Some(clip)) = (request.full_page, request.clip) {
            builder = builder
                .clip(CdpViewport {
                    x: clip.x,
                    y: clip.y,
                    width: clip.width,
                    height: clip.height,
                    scale: 1.0,
                })
                .capture_beyond_viewport(true);
        }

        self.page
            .screenshot(builder.build())
            .await
            .map_err(|e| BrowserError::Screenshot(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        let ChromiumPage { page, interceptor } = *self;
        if let Some(handle) = interceptor {
            handle.abort();
        }
        page.close().await.map_err(protocol_error)
    }
}
