//! Error categorization.
//!
//! Maps typed failures onto the [`ErrorType`] taxonomy used for statistics.

use super::types::{BrowserError, CaptureError, ErrorType, FallbackError};

/// Categorizes a browser driver failure.
pub fn categorize_browser_error(error: &BrowserError) -> ErrorType {
    match error {
        BrowserError::Launch(_) | BrowserError::SessionClosed => ErrorType::BrowserUnavailable,
        BrowserError::NavigationTimeout { .. } => ErrorType::NavigationTimeout,
        BrowserError::Navigation { .. } => ErrorType::NavigationFailed,
        BrowserError::Evaluation(_) => ErrorType::EvaluationFailed,
        BrowserError::Screenshot(_) => ErrorType::ScreenshotFailed,
        BrowserError::Protocol(_) => ErrorType::UnexpectedFailure,
    }
}

/// Categorizes a capture attempt failure.
pub fn categorize_capture_error(error: &CaptureError) -> ErrorType {
    match error {
        CaptureError::Browser(e) => categorize_browser_error(e),
        CaptureError::BadStatus { .. } => ErrorType::NonOkStatus,
        CaptureError::NoResponse(_) => ErrorType::NoResponse,
        CaptureError::Io(_) => ErrorType::ImageWriteFailed,
    }
}

/// Categorizes a fallback tier failure.
pub fn categorize_fallback_error(error: &FallbackError) -> ErrorType {
    match error {
        FallbackError::Http(_) | FallbackError::Upstream(_) => ErrorType::ReadmeUnavailable,
        FallbackError::Io(_) => ErrorType::ImageWriteFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_navigation_errors() {
        let timeout = BrowserError::NavigationTimeout {
            url: "https://a.dev".to_string(),
            timeout_secs: 30,
        };
        assert_eq!(
            categorize_browser_error(&timeout),
            ErrorType::NavigationTimeout
        );

        let failed = BrowserError::Navigation {
            url: "https://a.dev".to_string(),
            reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        };
        assert_eq!(
            categorize_browser_error(&failed),
            ErrorType::NavigationFailed
        );
    }

    #[test]
    fn test_categorize_capture_errors() {
        let bad_status = CaptureError::BadStatus {
            url: "https://a.dev".to_string(),
            status: 503,
        };
        assert_eq!(categorize_capture_error(&bad_status), ErrorType::NonOkStatus);

        let io = CaptureError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(categorize_capture_error(&io), ErrorType::ImageWriteFailed);

        let closed = CaptureError::Browser(BrowserError::SessionClosed);
        assert_eq!(
            categorize_capture_error(&closed),
            ErrorType::BrowserUnavailable
        );
    }

    #[test]
    fn test_categorize_fallback_errors() {
        let upstream = FallbackError::Upstream("bad json".to_string());
        assert_eq!(
            categorize_fallback_error(&upstream),
            ErrorType::ReadmeUnavailable
        );
        let io = FallbackError::Io(std::io::Error::other("disk full"));
        assert_eq!(categorize_fallback_error(&io), ErrorType::ImageWriteFailed);
    }
}
