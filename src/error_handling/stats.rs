//! Processing statistics tracking.
//!
//! Thread-safe error counters for a harvest run. Sites are processed
//! sequentially, but the bot-wall event listener and logger run on other
//! tasks, so the counters stay atomic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ErrorType;

/// Thread-safe processing statistics tracker.
///
/// All error types are initialized to zero on creation; counters can be
/// shared across tasks via `Arc`.
pub struct ProcessingStats {
    errors: HashMap<ErrorType, AtomicUsize>,
}

impl ProcessingStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }
        ProcessingStats { errors }
    }

    /// Increment an error counter.
    ///
    /// Never panics: every variant is inserted by `new()`, so a missing
    /// entry indicates a bug and is logged instead of crashing the run.
    pub fn increment(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                error
            );
        }
    }

    pub fn get(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}
