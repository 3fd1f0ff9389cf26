//! Error handling and pipeline statistics.
//!
//! This module provides:
//! - Error type definitions
//! - Categorization of typed failures into the [`ErrorType`] taxonomy
//! - Pipeline statistics tracking (failure categories, strategy usage)

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_browser_error, categorize_capture_error, categorize_fallback_error,
};
pub use stats::PipelineStats;
pub use types::{
    BrowserError, CaptureError, DatabaseError, ErrorType, FallbackError, InitializationError,
    PipelineError,
};
