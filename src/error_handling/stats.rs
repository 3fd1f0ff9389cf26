//! Pipeline statistics tracking.
//!
//! This module provides thread-safe counters for failure categories and for the
//! strategy that produced each project's image.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ErrorType;
use crate::models::Strategy;

/// Thread-safe pipeline statistics tracker.
///
/// Every [`ErrorType`] and [`Strategy`] has a counter initialized to zero on
/// creation, so lookups never miss. Shared across tasks with `Arc`.
pub struct PipelineStats {
    errors: HashMap<ErrorType, AtomicUsize>,
    strategies: HashMap<Strategy, AtomicUsize>,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
}

impl PipelineStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }

        let mut strategies = HashMap::new();
        for strategy in Strategy::iter() {
            strategies.insert(strategy, AtomicUsize::new(0));
        }

        PipelineStats {
            errors,
            strategies,
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        }
    }

    /// Increment an error counter.
    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map. \
                 This indicates a bug in PipelineStats initialization.",
                error
            );
        }
    }

    /// Records a project outcome: the winning strategy on success, a failure otherwise.
    pub fn record_outcome(&self, strategy: Option<Strategy>, success: bool) {
        match (success, strategy) {
            (true, Some(strategy)) => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
                if let Some(counter) = self.strategies.get(&strategy) {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            }
            _ => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Records a project that was not processed because it already had an image.
    pub fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn get_strategy_count(&self, strategy: Strategy) -> usize {
        self.strategies
            .get(&strategy)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Get total error count across all error types.
    pub fn total_errors(&self) -> usize {
        ErrorType::iter().map(|e| self.get_error_count(e)).sum()
    }

    /// Strategy usage as `(name, count)` pairs, in declaration order.
    pub fn strategy_counts(&self) -> Vec<(&'static str, usize)> {
        Strategy::iter()
            .map(|s| (s.as_str(), self.get_strategy_count(s)))
            .collect()
    }

    /// Non-zero error counters as `(description, count)` pairs, largest first.
    pub fn error_counts(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<_> = ErrorType::iter()
            .map(|e| (e.as_str(), self.get_error_count(e)))
            .filter(|(_, count)| *count > 0)
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}
