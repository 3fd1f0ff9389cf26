//! Per-capture settings: device, format, delays and retry budget.

use std::time::Duration;

use crate::config::{Config, DEFAULT_CAPTURE_HEIGHT, DEFAULT_CAPTURE_WIDTH};
use crate::user_agent::DeviceProfile;

/// Per-capture options.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Output width when no hero crop applies.
    pub width: u32,
    /// Output height when no hero crop applies.
    pub height: u32,
    /// Navigation timeout of each attempt.
    pub max_wait: Duration,
    /// Capture the whole scrollable page instead of a region.
    pub full_page: bool,
    pub suppress_overlays: bool,
    /// Crop to the detected hero section when there is one.
    pub optimize_hero: bool,
    /// Attempts after the first one.
    pub retry_count: u32,
    pub device: DeviceProfile,
}

impl CaptureOptions {
    /// Defaults with the timeout and retry budget taken from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_wait: config.capture_timeout(),
            retry_count: config.retry_count,
            ..Self::default()
        }
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_CAPTURE_WIDTH,
            height: DEFAULT_CAPTURE_HEIGHT,
            max_wait: crate::config::CAPTURE_NAVIGATION_TIMEOUT,
            full_page: false,
            suppress_overlays: true,
            optimize_hero: true,
            retry_count: crate::config::CAPTURE_RETRY_COUNT,
            device: DeviceProfile::Desktop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CaptureOptions::default();
        assert_eq!((options.width, options.height), (1200, 630));
        assert_eq!(options.retry_count, 2);
        assert!(options.suppress_overlays && options.optimize_hero);
        assert!(!options.full_page);
    }

    #[test]
    fn test_from_config_uses_capture_budget() {
        let config = Config {
            capture_timeout_secs: 10,
            retry_count: 5,
            ..Default::default()
        };
        let options = CaptureOptions::from_config(&config).with_retry_count(1);
        assert_eq!(options.max_wait, Duration::from_secs(10));
        assert_eq!(options.retry_count, 1);
    }
}
