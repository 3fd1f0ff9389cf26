//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::Config;

/// User-Agent sent to the source-repository API (required by GitHub).
const API_USER_AGENT: &str = concat!("smart_screenshot/", env!("CARGO_PKG_VERSION"));

/// Initializes the HTTP client used for source-repository calls.
///
/// Creates a `reqwest::Client` configured with:
/// - a crate-identifying User-Agent
/// - the configured overall timeout, and a shorter connect timeout
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.http_timeout_secs);
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .user_agent(API_USER_AGENT)
        .build()
}
