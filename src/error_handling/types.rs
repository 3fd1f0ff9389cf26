//! Error type definitions.
//!
//! This module defines all error types used throughout the application, plus the
//! [`ErrorType`] taxonomy used for failure statistics.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error preparing an output directory.
    #[error("Output directory error: {0}")]
    OutputDirError(#[from] std::io::Error),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A JSON column could not be encoded or decoded.
    #[error("Column encoding error: {0}")]
    EncodingError(#[from] serde_json::Error),

    /// No project with this id.
    #[error("Project not found: {0}")]
    NotFound(String),
}

/// Failures reported by a headless-browser driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    /// The browser process could not be started.
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// The session was closed before the operation.
    #[error("Browser session is closed")]
    SessionClosed,

    /// Navigation did not finish in time.
    #[error("Navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    /// Navigation failed (DNS, connection refused, aborted, detached frame).
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// An in-page script threw or returned something unusable.
    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    /// Taking the image failed.
    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    /// Any other protocol-level failure.
    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

/// Failures of a single capture attempt.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The page answered with a non-OK HTTP status.
    #[error("Page returned HTTP {status} for {url}")]
    BadStatus { url: String, status: u16 },

    /// Navigation completed without an HTTP response (e.g. blocked, data: URL).
    #[error("No HTTP response received for {0}")]
    NoResponse(String),

    /// The image could not be written.
    #[error("Failed to write screenshot: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a fallback tier.
#[derive(Error, Debug)]
pub enum FallbackError {
    /// The source-repository API call failed.
    #[error("Source repository request failed: {0}")]
    Http(#[from] ReqwestError),

    /// The source-repository API answered with something unusable.
    #[error("Source repository response unusable: {0}")]
    Upstream(String),

    /// Filesystem failure while reading the cache or writing a placeholder.
    #[error("Fallback I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Contract errors rejected at the pipeline boundary.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing or malformed project data.
    #[error("Invalid project input: {0}")]
    InvalidInput(String),

    /// Project store failure.
    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// Expected failure conditions, counted in [`super::PipelineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Navigation
    NavigationTimeout,
    NavigationFailed,
    NonOkStatus,
    NoResponse,
    // Gate conditions
    LoginGate,
    ErrorPage,
    // Browser
    BrowserUnavailable,
    EvaluationFailed,
    ScreenshotFailed,
    ImageWriteFailed,
    // Fallback tiers
    ReadmeUnavailable,
    NoReadmeImages,
    CacheMiss,
    PlaceholderFailed,
    // Anything else
    UnexpectedFailure,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::NavigationTimeout => "Navigation timeout",
            ErrorType::NavigationFailed => "Navigation failed",
            ErrorType::NonOkStatus => "Non-OK HTTP status",
            ErrorType::NoResponse => "No HTTP response",
            ErrorType::LoginGate => "Login page",
            ErrorType::ErrorPage => "Error page",
            ErrorType::BrowserUnavailable => "Browser unavailable",
            ErrorType::EvaluationFailed => "Script evaluation failed",
            ErrorType::ScreenshotFailed => "Screenshot failed",
            ErrorType::ImageWriteFailed => "Image write failed",
            ErrorType::ReadmeUnavailable => "README unavailable",
            ErrorType::NoReadmeImages => "No usable README images",
            ErrorType::CacheMiss => "No cached screenshot",
            ErrorType::PlaceholderFailed => "Placeholder generation failed",
            ErrorType::UnexpectedFailure => "Unexpected failure",
        }
    }
}
