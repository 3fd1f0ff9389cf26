//! Logger initialization.

use std::io::Write;

use colored::{ColoredString, Colorize};
use env_logger::fmt::Formatter;
use log::{Level, LevelFilter, Record};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependencies that are chatty at our default level.
const DEPENDENCY_LEVELS: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("sqlx", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    // the CDP handler reports every event it cannot parse at error level
    ("chromiumoxide", LevelFilter::Error),
    ("tungstenite", LevelFilter::Warn),
];

/// Installs the global logger.
///
/// `RUST_LOG` is honored for anything not pinned here; `level` always applies
/// to this crate. Plain output is colored, JSON output is one object per line.
///
/// ```bash
/// RUST_LOG=chromiumoxide=debug smart_screenshot --log-level debug run --all-pending
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, module_level) in DEPENDENCY_LEVELS {
        builder.filter_module(module, *module_level);
    }
    builder.filter_module(env!("CARGO_CRATE_NAME"), level);

    match format {
        LogFormat::Json => builder.format(write_json),
        LogFormat::Plain => builder.format(write_plain),
    };

    builder.try_init().map_err(InitializationError::from)
}

fn write_plain(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    writeln!(
        buf,
        "{} {} [{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        record.target().cyan(),
        level_label(record.level()),
        record.args()
    )
}

fn write_json(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    let line = serde_json::json!({
        "ts": chrono::Utc::now().timestamp_millis(),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    });
    writeln!(buf, "{line}")
}

fn level_label(level: Level) -> ColoredString {
    let label = level.as_str();
    match level {
        Level::Error => label.red(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    }
}
