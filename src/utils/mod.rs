//! Shared utilities.
//!
//! This module provides:
//! - A bounded retry policy used by capture and alternative-URL logic
//! - Name, filename and error message sanitization
//! - URL validation and source-repository URL parsing

mod retry;
pub mod sanitize;
mod url;

pub use retry::{RetryOutcome, RetryPolicy};
pub use self::url::{https_upgrade, parse_repo_url, validate_and_normalize_url, RepoRef};

/// Milliseconds elapsed since `start`.
pub fn elapsed_ms(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
