//! End-of-run statistics reporting.

use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, ProcessingStats};

/// Logs a summary of non-zero error counters at the end of a run.
pub fn print_error_statistics(stats: &ProcessingStats) {
    let mut any = false;
    for error_type in ErrorType::iter() {
        let count = stats.get(error_type);
        if count > 0 {
            log::info!("{}: {}", error_type.label(), count);
            any = true;
        }
    }
    if !any {
        log::info!("No errors recorded during this run");
    }
}
