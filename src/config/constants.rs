//! Configuration constants.
//!
//! This module defines the constants used as defaults throughout the pipeline,
//! including timeouts, delays, scoring thresholds and output layout.

use std::time::Duration;

// Network operation timeouts
/// Navigation timeout used when health-testing a candidate URL.
/// Only DOM readiness is awaited, so 30s is generous even for slow hosts.
pub const HEALTH_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
/// Navigation timeout used by the capture engine (a full document is required).
pub const CAPTURE_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);
/// Timeout for each individual content-readiness wait strategy.
pub const READINESS_STRATEGY_TIMEOUT: Duration = Duration::from_secs(5);
/// Interval between polls inside a readiness wait strategy.
pub const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Upper bound on the unconditional delay applied after the readiness race.
pub const MAX_BASE_DELAY: Duration = Duration::from_secs(8);
/// Settle time before the image is taken, for CSS transitions to finish.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);
/// HTTP timeout for source-repository API calls.
pub const HTTP_TIMEOUT_SECS: u64 = 15;

// Retry strategy
/// Additional capture attempts after the first one.
/// Set to 2 = initial attempt + 2 retries (3 attempts total).
pub const CAPTURE_RETRY_COUNT: u32 = 2;
/// Additional capture attempts for each alternative URL after the primary failed.
pub const ALTERNATIVE_RETRY_COUNT: u32 = 1;
/// Pause between capture attempts.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);
/// Maximum number of alternative URLs tried after the primary capture failed.
pub const MAX_ALTERNATIVE_URLS: usize = 3;

// Politeness
/// Number of candidate URLs tested concurrently.
pub const CANDIDATE_BATCH_SIZE: usize = 3;
/// Pause between candidate test batches.
pub const CANDIDATE_BATCH_PAUSE: Duration = Duration::from_secs(1);
/// Pause between projects in bulk mode.
pub const INTER_PROJECT_DELAY: Duration = Duration::from_secs(2);

// Image output
/// Default capture width in pixels (Open Graph card size).
pub const DEFAULT_CAPTURE_WIDTH: u32 = 1200;
/// Default capture height in pixels.
pub const DEFAULT_CAPTURE_HEIGHT: u32 = 630;
/// Smallest hero crop width; smaller detected heroes are widened.
pub const MIN_HERO_WIDTH: u32 = 800;
/// Smallest hero crop height.
pub const MIN_HERO_HEIGHT: u32 = 500;
/// JPEG quality for captured screenshots.
pub const SCREENSHOT_QUALITY: u8 = 88;
/// Subdirectory of the output root holding captured screenshots.
pub const SCREENSHOT_SUBDIR: &str = "screenshots";
/// Subdirectory of the output root holding generated placeholders.
pub const PLACEHOLDER_SUBDIR: &str = "placeholders";
/// Default output root (public asset tree).
pub const DEFAULT_OUTPUT_DIR: &str = "./public";
/// Default SQLite project database.
pub const DB_PATH: &str = "./portfolio.db";

// README images
/// README images scoring below this are discarded.
pub const README_MIN_CONFIDENCE: u8 = 30;

// Source repository API
/// Default GitHub REST API base URL.
pub const GITHUB_API_BASE: &str = "https://api.github.com";
/// Default raw-content base URL.
pub const GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";

// Admin server
/// Default listen address for the admin trigger.
pub const ADMIN_LISTEN_ADDR: &str = "127.0.0.1:8787";

/// Maximum URL length accepted from project records or manual overrides.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum error message length kept in results (longer messages are truncated).
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;
