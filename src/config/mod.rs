//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, delays, output layout)
//! - Heuristic pattern tables
//! - CLI option types and parsing

mod constants;
mod patterns;
mod types;

// Re-export all constants
pub use constants::*;
pub use patterns::PatternTables;
pub use types::{Cli, Command, Config, LogFormat, LogLevel, ScoringWeights};
