//! Error type definitions.

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
}

/// Errors produced while harvesting a single site.
///
/// Only `NoSourceFound` ever escalates to a per-site failure in the batch
/// report; fetch and decode errors are fallback signals inside the walkers
/// ("try the next candidate"), and `InvalidUrl` is rejected before any
/// network access.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// The input string could not be normalized into an http(s) URL.
    #[error("Invalid URL format")]
    InvalidUrl(String),

    /// An outbound request failed (timeout, DNS, TLS, or error status).
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// A response body could not be decoded as the expected XML shape.
    #[error("Failed to parse XML: {0}")]
    Decode(String),

    /// Neither the sitemap nor the feed strategy produced any URLs.
    #[error("Could not find any sitemap or feed for {0}")]
    NoSourceFound(String),
}

/// Types of errors that can occur while probing a site.
///
/// These feed the per-run `ProcessingStats` counters; they categorize
/// conditions, not individual error values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // HTTP/Network errors
    HttpRequestTimeoutError,
    HttpRequestConnectError,
    HttpRequestStatusError,
    HttpRequestBodyError,
    HttpRequestOtherError,
    // Walker-level conditions
    XmlDecodeError,
    NoSourceFound,
    InvalidUrl,
    // Enrichment failures (never site-fatal)
    HeadProbeError,
    BrowserError,
}

/// Truncates a message to at most `max_len` bytes without splitting a
/// character.
///
/// `String::truncate` panics when the cut lands mid-character, and error
/// messages can echo multibyte text from fetched bodies (tag names in XML
/// parse errors, remote hostnames), so the cut is walked back to the nearest
/// char boundary first.
pub fn clip_message(message: &mut String, max_len: usize) {
    if message.len() <= max_len {
        return;
    }
    let mut cut = max_len;
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    message.truncate(cut);
}

impl ErrorType {
    /// Human-readable label used in the end-of-run statistics printout.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorType::HttpRequestTimeoutError => "request timeouts",
            ErrorType::HttpRequestConnectError => "connection failures",
            ErrorType::HttpRequestStatusError => "error statuses",
            ErrorType::HttpRequestBodyError => "body read failures",
            ErrorType::HttpRequestOtherError => "other request errors",
            ErrorType::XmlDecodeError => "XML decode failures",
            ErrorType::NoSourceFound => "sites with no sitemap or feed",
            ErrorType::InvalidUrl => "invalid input URLs",
            ErrorType::HeadProbeError => "HEAD probe failures",
            ErrorType::BrowserError => "browser check failures",
        }
    }
}
