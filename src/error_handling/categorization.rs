//! Error categorization.

use super::stats::ProcessingStats;
use super::types::ErrorType;

/// Categorizes a `reqwest::Error` into an `ErrorType`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if error.is_timeout() {
        ErrorType::HttpRequestTimeoutError
    } else if error.is_connect() {
        ErrorType::HttpRequestConnectError
    } else if error.is_status() {
        ErrorType::HttpRequestStatusError
    } else if error.is_body() || error.is_decode() {
        ErrorType::HttpRequestBodyError
    } else {
        ErrorType::HttpRequestOtherError
    }
}

/// Records a harvest error against the run statistics.
pub fn update_error_stats(stats: &ProcessingStats, error: &crate::error_handling::HarvestError) {
    use crate::error_handling::HarvestError;
    match error {
        HarvestError::InvalidUrl(_) => stats.increment(ErrorType::InvalidUrl),
        HarvestError::Fetch { source, .. } => stats.increment(categorize_reqwest_error(source)),
        HarvestError::Decode(_) => stats.increment(ErrorType::XmlDecodeError),
        HarvestError::NoSourceFound(_) => stats.increment(ErrorType::NoSourceFound),
    }
}
