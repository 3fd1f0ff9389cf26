// Shared test helpers: a scripted browser and ready-made configurations.
//
// Each test binary includes this file with `mod helpers;`, so not every helper
// is used everywhere.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use smart_screenshot::browser::{
    BrowserPage, BrowserSession, NavigationResponse, PageSetup, RequestFilter, ScreenshotRequest,
};
use smart_screenshot::error_handling::BrowserError;
use smart_screenshot::fallback::GitHubClient;
use smart_screenshot::storage::{InMemoryProjectStore, ProjectStore};
use smart_screenshot::{Config, RunResources};

/// How a scripted URL behaves.
#[derive(Debug, Clone)]
pub struct FakeSite {
    pub status: Option<u16>,
    /// URL after redirects; the requested URL when `None`
    pub final_url: Option<String>,
    /// Value returned by the page-signals script
    pub signals: Value,
    /// Screenshots of this URL fail this many times before succeeding
    pub screenshot_failures: u32,
    /// Hero rectangle reported by the content inspection
    pub hero: Option<Value>,
    /// Only readiness scripts containing this marker hold; all do when `None`
    pub ready_marker: Option<&'static str>,
}

impl FakeSite {
    /// A healthy, content-rich page that scores as screenshotable.
    pub fn healthy(title: &str) -> Self {
        Self {
            status: Some(200),
            final_url: None,
            signals: rich_signals(title),
            screenshot_failures: 0,
            hero: None,
            ready_marker: None,
        }
    }

    /// A page that redirects to a login form.
    pub fn login_redirect(final_url: &str) -> Self {
        Self {
            status: Some(200),
            final_url: Some(final_url.to_string()),
            signals: login_signals(),
            screenshot_failures: 0,
            hero: None,
            ready_marker: None,
        }
    }

    pub fn failing_screenshots(mut self, failures: u32) -> Self {
        self.screenshot_failures = failures;
        self
    }

    pub fn with_hero(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.hero = Some(json!({ "x": x, "y": y, "width": width, "height": height }));
        self
    }

    /// Readiness checks other than the one whose script contains `marker` never hold.
    pub fn ready_only_on(mut self, marker: &'static str) -> Self {
        self.ready_marker = Some(marker);
        self
    }
}

/// Signals of a storefront: navigation, structure, images and a few hundred words.
pub fn rich_signals(title: &str) -> Value {
    let body = "Handmade ceramics shipped worldwide. ".repeat(16);
    json!({
        "title": title,
        "bodyText": body,
        "bodyTextLength": body.len(),
        "imageCount": 5,
        "hasNavigation": true,
        "buttonCount": 3,
        "linkCount": 10,
        "structuralCount": 5,
        "hasMainContent": true,
        "hasPasswordField": false,
    })
}

/// Signals of a bare login form.
pub fn login_signals() -> Value {
    json!({
        "title": "Sign in",
        "bodyText": "Sign in to continue. Email Password",
        "bodyTextLength": 35,
        "imageCount": 0,
        "hasNavigation": false,
        "buttonCount": 1,
        "linkCount": 1,
        "structuralCount": 1,
        "hasMainContent": false,
        "hasPasswordField": true,
    })
}

#[derive(Default)]
struct FakeState {
    sites: HashMap<String, FakeSite>,
    health_navigations: Vec<String>,
    capture_navigations: Vec<String>,
    screenshots_taken: Vec<String>,
    screenshot_requests: Vec<ScreenshotRequest>,
    readiness_polls: usize,
    failures_left: HashMap<String, u32>,
    pages_opened: usize,
    pages_closed: usize,
    open_pages: usize,
    peak_open_pages: usize,
    navigation_delay: Duration,
    session_closes: usize,
}

/// Browser session whose pages answer from a table of scripted sites.
///
/// Unknown URLs fail to navigate, like an unresolvable host would.
#[derive(Clone, Default)]
pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(self, url: &str, site: FakeSite) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state
                .failures_left
                .insert(url.to_string(), site.screenshot_failures);
            state.sites.insert(url.to_string(), site);
        }
        self
    }

    /// Every navigation, known URL or not, takes this long.
    pub fn with_navigation_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().navigation_delay = delay;
        self
    }

    /// URLs navigated by health-test pages, in order.
    pub fn health_navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().health_navigations.clone()
    }

    /// URLs navigated by capture pages, in order.
    pub fn capture_navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().capture_navigations.clone()
    }

    pub fn screenshots_taken(&self) -> Vec<String> {
        self.state.lock().unwrap().screenshots_taken.clone()
    }

    pub fn screenshot_requests(&self) -> Vec<ScreenshotRequest> {
        self.state.lock().unwrap().screenshot_requests.clone()
    }

    /// Evaluations of readiness scripts, across all pages.
    pub fn readiness_polls(&self) -> usize {
        self.state.lock().unwrap().readiness_polls
    }

    /// Most pages open at the same time.
    pub fn peak_open_pages(&self) -> usize {
        self.state.lock().unwrap().peak_open_pages
    }

    /// (opened, closed) page counts.
    pub fn page_counts(&self) -> (usize, usize) {
        let state = self.state.lock().unwrap();
        (state.pages_opened, state.pages_closed)
    }

    pub fn session_closes(&self) -> usize {
        self.state.lock().unwrap().session_closes
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn new_page(&self, setup: &PageSetup) -> Result<Box<dyn BrowserPage>, BrowserError> {
        {
            let mut state = self.state.lock().unwrap();
            state.pages_opened += 1;
            state.open_pages += 1;
            state.peak_open_pages = state.peak_open_pages.max(state.open_pages);
        }
        Ok(Box::new(FakePage {
            state: Arc::clone(&self.state),
            health: setup.request_filter == Some(RequestFilter::health_check()),
            current: Mutex::new(None),
        }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.state.lock().unwrap().session_closes += 1;
        Ok(())
    }
}

struct FakePage {
    state: Arc<Mutex<FakeState>>,
    health: bool,
    current: Mutex<Option<String>>,
}

impl FakePage {
    fn site(&self) -> Result<(String, FakeSite), BrowserError> {
        let url = self
            .current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BrowserError::Evaluation("no document loaded".to_string()))?;
        let site = self
            .state
            .lock()
            .unwrap()
            .sites
            .get(&url)
            .cloned()
            .ok_or_else(|| BrowserError::Evaluation(format!("no site for {url}")))?;
        Ok((url, site))
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn navigate(
        &self,
        url: &str,
        _timeout: Duration,
    ) -> Result<NavigationResponse, BrowserError> {
        let (site, delay) = {
            let mut state = self.state.lock().unwrap();
            if self.health {
                state.health_navigations.push(url.to_string());
            } else {
                state.capture_navigations.push(url.to_string());
            }
            (state.sites.get(url).cloned(), state.navigation_delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let Some(site) = site else {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        };
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(NavigationResponse {
            status: site.status,
            final_url: site.final_url.unwrap_or_else(|| url.to_string()),
        })
    }

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        let (_, site) = self.site()?;
        if script == "document.title" {
            return Ok(site.signals["title"].clone());
        }
        if script.contains("bodyTextLength") {
            return Ok(site.signals);
        }
        if script.contains("hasHero") {
            let has_hero = site.hero.is_some();
            return Ok(json!({
                "hasContent": true,
                "hasHero": has_hero,
                "hero": site.hero,
            }));
        }
        if script.contains("hidden += 1") {
            return Ok(json!(0));
        }
        // anything else is a readiness check
        self.state.lock().unwrap().readiness_polls += 1;
        let holds = site.ready_marker.map_or(true, |marker| script.contains(marker));
        Ok(Value::Bool(holds))
    }

    async fn screenshot(&self, request: &ScreenshotRequest) -> Result<Vec<u8>, BrowserError> {
        let (url, _) = self.site()?;
        let mut state = self.state.lock().unwrap();
        state.screenshot_requests.push(request.clone());
        if let Some(left) = state.failures_left.get_mut(&url) {
            if *left > 0 {
                *left -= 1;
                return Err(BrowserError::Screenshot(
                    "Target closed while capturing".to_string(),
                ));
            }
        }
        state.screenshots_taken.push(url);
        Ok(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.pages_closed += 1;
        state.open_pages -= 1;
        Ok(())
    }
}

/// Zero-delay configuration writing into `dir`, with the source-repository
/// API pointed at `github_base` (an address nothing answers on by default).
pub fn test_config(dir: &Path, github_base: Option<&str>) -> Config {
    let base = github_base.unwrap_or("http://127.0.0.1:9").to_string();
    Config {
        output_dir: dir.join("public"),
        github_api_base: base.clone(),
        github_raw_base: format!("{base}/raw"),
        http_timeout_secs: 5,
        ..Config::without_delays()
    }
}

pub fn github_client(config: &Config) -> Arc<GitHubClient> {
    Arc::new(GitHubClient::new(reqwest::Client::new(), config))
}

/// Run resources over the fake browser and an in-memory store.
pub fn test_resources(
    config: Config,
    session: FakeSession,
    store: InMemoryProjectStore,
) -> RunResources {
    let config = Arc::new(config);
    RunResources {
        github: github_client(&config),
        config,
        store: Arc::new(store) as Arc<dyn ProjectStore>,
        session: Arc::new(session),
    }
}
