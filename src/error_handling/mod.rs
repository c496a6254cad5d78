//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions and categorization
//! - Processing statistics tracking
//!
//! The propagation policy follows the harvest failure model: fetch and
//! decode errors mean "try the next candidate" inside the walkers, discovery
//! exhaustion is the only per-site hard failure, and enrichment errors
//! (ad-tag scrape, bot-wall check) are downgraded to empty results.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, update_error_stats};
pub use stats::ProcessingStats;
pub use types::{clip_message, ErrorType, HarvestError, InitializationError};
