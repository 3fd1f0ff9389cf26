//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::*;
use crate::config::patterns::PatternTables;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Numeric weights and thresholds used by candidate scoring and selection.
///
/// The defaults are the historical values; none of them is derived from
/// anything deeper than experience, so callers may tune them freely.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    /// Share of the accessibility score in the confidence score.
    pub accessibility_weight: f64,
    /// Share of the content-quality score in the confidence score.
    pub quality_weight: f64,
    /// Accessibility must be strictly above this to be screenshotable.
    pub screenshotable_min_accessibility: u8,
    /// Content quality must be strictly above this to be screenshotable.
    pub screenshotable_min_quality: u8,
    /// Subtracted from confidence for login pages.
    pub login_penalty: f64,
    /// Subtracted from confidence for error pages.
    pub error_penalty: f64,
    /// Subtracted from confidence when no main content was found.
    pub no_content_penalty: f64,
    /// Confidence bonus for the project's own deployment URL.
    pub deployment_bonus: f64,
    /// Confidence bonus for static-pages URLs derived from the source repository.
    pub source_repo_bonus: f64,
    /// Confidence bonus for domain-pattern guesses.
    pub domain_pattern_bonus: f64,
    /// Confidence bonus for manually supplied URLs.
    pub manual_bonus: f64,
    /// Fallback pick when nothing is screenshotable: first candidate above this.
    pub usable_confidence: u8,
    /// Alternatives tried after a failed capture must be above this.
    pub alternative_min_confidence: u8,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            accessibility_weight: 0.6,
            quality_weight: 0.4,
            screenshotable_min_accessibility: 60,
            screenshotable_min_quality: 40,
            login_penalty: 80.0,
            error_penalty: 70.0,
            no_content_penalty: 30.0,
            deployment_bonus: 20.0,
            source_repo_bonus: 10.0,
            domain_pattern_bonus: 5.0,
            manual_bonus: 0.0,
            usable_confidence: 30,
            alternative_min_confidence: 20,
        }
    }
}

/// Library configuration.
///
/// Every field has a CLI flag except the heuristic tables and scoring weights,
/// which are only adjustable programmatically.
///
/// # Examples
///
/// ```no_run
/// use smart_screenshot::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     output_dir: PathBuf::from("./public"),
///     retry_count: 1,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// Project database path (SQLite file)
    #[arg(long, default_value = DB_PATH, global = true)]
    pub db_path: PathBuf,

    /// Public asset root; screenshots and placeholders are written below it
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR, global = true)]
    pub output_dir: PathBuf,

    /// URL prefix of the output directory, used in returned image paths
    #[arg(long, default_value = "/", global = true)]
    pub public_prefix: String,

    /// Navigation timeout when health-testing candidates, in seconds
    #[arg(long, default_value_t = HEALTH_NAVIGATION_TIMEOUT.as_secs(), global = true)]
    pub health_timeout_secs: u64,

    /// Navigation timeout when capturing, in seconds
    #[arg(long, default_value_t = CAPTURE_NAVIGATION_TIMEOUT.as_secs(), global = true)]
    pub capture_timeout_secs: u64,

    /// Timeout of each readiness wait strategy, in milliseconds
    #[arg(long, default_value_t = READINESS_STRATEGY_TIMEOUT.as_millis() as u64, global = true)]
    pub readiness_timeout_ms: u64,

    /// Unconditional delay after the readiness race, in milliseconds (capped at 8s)
    #[arg(long, default_value_t = 3000, global = true)]
    pub base_delay_ms: u64,

    /// Settle delay before taking the image, in milliseconds
    #[arg(long, default_value_t = SETTLE_DELAY.as_millis() as u64, global = true)]
    pub settle_delay_ms: u64,

    /// Additional capture attempts against the primary URL
    #[arg(long, default_value_t = CAPTURE_RETRY_COUNT, global = true)]
    pub retry_count: u32,

    /// Additional capture attempts against each alternative URL
    #[arg(long, default_value_t = ALTERNATIVE_RETRY_COUNT, global = true)]
    pub alternative_retry_count: u32,

    /// Pause between capture attempts, in milliseconds
    #[arg(long, default_value_t = RETRY_BACKOFF.as_millis() as u64, global = true)]
    pub retry_backoff_ms: u64,

    /// Candidate URLs tested concurrently
    #[arg(long, default_value_t = CANDIDATE_BATCH_SIZE, global = true)]
    pub batch_size: usize,

    /// Pause between candidate test batches, in milliseconds
    #[arg(long, default_value_t = CANDIDATE_BATCH_PAUSE.as_millis() as u64, global = true)]
    pub batch_pause_ms: u64,

    /// Pause between projects in bulk mode, in milliseconds
    #[arg(long, default_value_t = INTER_PROJECT_DELAY.as_millis() as u64, global = true)]
    pub project_delay_ms: u64,

    /// Source repository REST API base URL
    #[arg(long, default_value = GITHUB_API_BASE, global = true)]
    pub github_api_base: String,

    /// Source repository raw-content base URL
    #[arg(long, default_value = GITHUB_RAW_BASE, global = true)]
    pub github_raw_base: String,

    /// Source repository API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub github_token: Option<String>,

    /// HTTP timeout for source repository calls, in seconds
    #[arg(long, default_value_t = HTTP_TIMEOUT_SECS, global = true)]
    pub http_timeout_secs: u64,

    /// Chrome/Chromium executable (auto-detected when omitted)
    #[arg(long, global = true)]
    pub chrome_path: Option<PathBuf>,

    /// Bearer token required by the admin trigger
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true, global = true)]
    pub admin_token: Option<String>,

    /// Login/error/content/overlay heuristics
    #[arg(skip)]
    pub patterns: PatternTables,

    /// Scoring weights and thresholds
    #[arg(skip)]
    pub weights: ScoringWeights,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            public_prefix: "/".to_string(),
            health_timeout_secs: HEALTH_NAVIGATION_TIMEOUT.as_secs(),
            capture_timeout_secs: CAPTURE_NAVIGATION_TIMEOUT.as_secs(),
            readiness_timeout_ms: READINESS_STRATEGY_TIMEOUT.as_millis() as u64,
            base_delay_ms: 3000,
            settle_delay_ms: SETTLE_DELAY.as_millis() as u64,
            retry_count: CAPTURE_RETRY_COUNT,
            alternative_retry_count: ALTERNATIVE_RETRY_COUNT,
            retry_backoff_ms: RETRY_BACKOFF.as_millis() as u64,
            batch_size: CANDIDATE_BATCH_SIZE,
            batch_pause_ms: CANDIDATE_BATCH_PAUSE.as_millis() as u64,
            project_delay_ms: INTER_PROJECT_DELAY.as_millis() as u64,
            github_api_base: GITHUB_API_BASE.to_string(),
            github_raw_base: GITHUB_RAW_BASE.to_string(),
            github_token: None,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            chrome_path: None,
            admin_token: None,
            patterns: PatternTables::default(),
            weights: ScoringWeights::default(),
        }
    }
}

impl Config {
    /// Configuration with every delay set to zero, for tests and dry runs.
    pub fn without_delays() -> Self {
        Self {
            readiness_timeout_ms: 0,
            base_delay_ms: 0,
            settle_delay_ms: 0,
            retry_backoff_ms: 0,
            batch_pause_ms: 0,
            project_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.capture_timeout_secs)
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    /// Base delay after the readiness race, never more than [`MAX_BASE_DELAY`].
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms).min(MAX_BASE_DELAY)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    pub fn project_delay(&self) -> Duration {
        Duration::from_millis(self.project_delay_ms)
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.output_dir.join(SCREENSHOT_SUBDIR)
    }

    pub fn placeholder_dir(&self) -> PathBuf {
        self.output_dir.join(PLACEHOLDER_SUBDIR)
    }

    /// Public path of a file written to `subdir` of the output directory.
    pub fn public_path(&self, subdir: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_prefix.trim_end_matches('/'),
            subdir,
            filename
        )
    }
}

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(name = "smart_screenshot", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

/// Operator commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate preview images for projects in the store
    Run {
        /// Project id to process (repeatable)
        #[arg(long = "project-id")]
        project_ids: Vec<String>,
        /// Process every project without an image
        #[arg(long)]
        all_pending: bool,
        /// Process every project in the store
        #[arg(long, conflicts_with = "all_pending")]
        all: bool,
        /// Regenerate even when the project already has an image
        #[arg(long)]
        force: bool,
    },
    /// Start the authenticated admin trigger
    Serve {
        /// Listen address
        #[arg(long, default_value = ADMIN_LISTEN_ADDR)]
        listen: String,
    },
    /// Print the candidate URLs generated for a project (no network access)
    Candidates {
        /// Project name
        name: String,
        /// Known deployment URL
        #[arg(long)]
        deployment_url: Option<String>,
        /// Source repository URL
        #[arg(long)]
        repo_url: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.retry_count, 2);
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.health_timeout(), Duration::from_secs(30));
        assert_eq!(config.capture_timeout(), Duration::from_secs(45));
        assert_eq!(config.db_path, PathBuf::from(DB_PATH));
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn test_base_delay_is_capped() {
        let config = Config {
            base_delay_ms: 60_000,
            ..Default::default()
        };
        assert_eq!(config.base_delay(), MAX_BASE_DELAY);
    }

    #[test]
    fn test_without_delays_zeroes_timers() {
        let config = Config::without_delays();
        assert_eq!(config.retry_backoff(), Duration::ZERO);
        assert_eq!(config.batch_pause(), Duration::ZERO);
        assert_eq!(config.project_delay(), Duration::ZERO);
        assert_eq!(config.settle_delay(), Duration::ZERO);
        // unrelated settings keep their defaults
        assert_eq!(config.retry_count, CAPTURE_RETRY_COUNT);
    }

    #[test]
    fn test_output_subdirectories() {
        let config = Config {
            output_dir: PathBuf::from("/srv/public"),
            ..Default::default()
        };
        assert_eq!(
            config.screenshot_dir(),
            PathBuf::from("/srv/public/screenshots")
        );
        assert_eq!(
            config.placeholder_dir(),
            PathBuf::from("/srv/public/placeholders")
        );
    }

    #[test]
    fn test_public_path_joins_prefix() {
        let config = Config::default();
        assert_eq!(
            config.public_path(SCREENSHOT_SUBDIR, "a-1.jpg"),
            "/screenshots/a-1.jpg"
        );
        let cdn = Config {
            public_prefix: "https://cdn.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            cdn.public_path(PLACEHOLDER_SUBDIR, "a-1.svg"),
            "https://cdn.example.com/placeholders/a-1.svg"
        );
    }

    #[test]
    fn test_cli_parses_run_command() {
        let cli = Cli::try_parse_from([
            "smart_screenshot",
            "run",
            "--project-id",
            "a",
            "--project-id",
            "b",
            "--force",
        ])
        .expect("valid arguments");
        match cli.command {
            Command::Run {
                project_ids, force, ..
            } => {
                assert_eq!(project_ids, vec!["a".to_string(), "b".to_string()]);
                assert!(force);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_all_with_all_pending() {
        let result = Cli::try_parse_from(["smart_screenshot", "run", "--all", "--all-pending"]);
        assert!(result.is_err());
    }
}
