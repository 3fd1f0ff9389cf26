//! Headless-browser capability interface.
//!
//! The pipeline only ever talks to a browser through [`BrowserSession`] and
//! [`BrowserPage`]. The production backend is [`ChromiumSession`]; tests supply
//! scripted fakes.
//!
//! One session (browser process) is shared by a whole run. Every health test
//! and every capture attempt opens its own page and closes it afterwards, so
//! a crashed tab never takes the session down with it.

mod chromium;
mod filter;
pub mod scripts;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error_handling::BrowserError;

pub use chromium::ChromiumSession;
pub use filter::{FilterDecision, ImagePolicy, RequestFilter, ResourceKind};

/// Tab viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
    pub mobile: bool,
}

/// Everything a tab needs before it navigates anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub viewport: Viewport,
    pub user_agent: String,
    /// Requests to abort; `None` lets everything through.
    pub request_filter: Option<RequestFilter>,
}

/// What the main-frame navigation returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResponse {
    /// HTTP status of the main document, if a response was received.
    pub status: Option<u16>,
    /// URL after redirects.
    pub final_url: String,
}

/// Encoded image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

/// Page rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Parameters of a single screenshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotRequest {
    pub format: ImageFormat,
    /// 0-100, ignored for PNG
    pub quality: u8,
    /// Capture the whole scrollable page; `clip` is ignored when set.
    pub full_page: bool,
    pub clip: Option<ClipRegion>,
}

/// A running browser that can open isolated tabs.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Opens a fresh tab configured with `setup`.
    async fn new_page(&self, setup: &PageSetup) -> Result<Box<dyn BrowserPage>, BrowserError>;

    /// Shuts the browser down. Later calls to `new_page` may relaunch it.
    async fn close(&self) -> Result<(), BrowserError>;
}

/// One browser tab.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigates the tab, waiting for DOM readiness at most `timeout`.
    async fn navigate(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<NavigationResponse, BrowserError>;

    /// Evaluates a JavaScript expression (promises are awaited) and returns its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    /// Takes a screenshot and returns the encoded bytes.
    async fn screenshot(&self, request: &ScreenshotRequest) -> Result<Vec<u8>, BrowserError>;

    /// Closes the tab.
    async fn close(self: Box<Self>) -> Result<(), BrowserError>;
}

/// Closes a page, logging instead of failing. Used on cleanup paths.
pub async fn close_quietly(page: Box<dyn BrowserPage>) {
    if let Err(e) = page.close().await {
        log::debug!("Failed to close browser page: {e}");
    }
}
