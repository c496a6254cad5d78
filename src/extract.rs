//! Extraction orchestration.
//!
//! Runs the sitemap and feed walkers in a configurable order: the primary
//! strategy first, the secondary only when the primary finds nothing. The
//! orchestrator owns the limit (walkers return uncapped lists) and records
//! which source ultimately supplied the URLs.

use log::info;
use reqwest::Client;
use serde::Serialize;

use crate::error_handling::{HarvestError, ProcessingStats};
use crate::{feed, sitemap};

/// Which source a site's URLs ultimately came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Sitemap,
    Feed,
    /// Reserved for merged-source extraction; currently never produced.
    Mixed,
    Unknown,
}

/// Strategy ordering for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePriority {
    SitemapFirst,
    FeedFirst,
}

impl SourcePriority {
    /// The two strategies in the order they are attempted.
    pub fn strategy_order(self) -> [SourceKind; 2] {
        match self {
            SourcePriority::SitemapFirst => [SourceKind::Sitemap, SourceKind::Feed],
            SourcePriority::FeedFirst => [SourceKind::Feed, SourceKind::Sitemap],
        }
    }
}

/// The outcome of a successful extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Discovered URLs, truncated to the limit.
    pub urls: Vec<String>,
    /// The source that supplied them.
    pub source: SourceKind,
    /// How many URLs were discovered before truncation.
    pub total: usize,
}

async fn run_strategy(
    client: &Client,
    stats: &ProcessingStats,
    site_url: &str,
    limit: usize,
    kind: SourceKind,
) -> Vec<String> {
    match kind {
        SourceKind::Sitemap => sitemap::walk(client, stats, site_url, limit).await,
        SourceKind::Feed => feed::walk(client, stats, site_url).await,
        SourceKind::Mixed | SourceKind::Unknown => Vec::new(),
    }
}

/// Extracts article URLs from a site, falling back from the primary strategy
/// to the secondary.
///
/// A `limit` of zero means unlimited; otherwise the result is truncated to
/// `limit` with the pre-truncation count preserved in `total`.
///
/// # Errors
///
/// Returns `HarvestError::NoSourceFound` when both strategies come back
/// empty. This is the only hard failure extraction produces; everything
/// upstream (failed probes, malformed documents) has already been logged and
/// swallowed by the walkers.
pub async fn extract(
    client: &Client,
    stats: &ProcessingStats,
    site_url: &str,
    limit: usize,
    priority: SourcePriority,
) -> Result<ExtractionResult, HarvestError> {
    for kind in priority.strategy_order() {
        let mut urls = run_strategy(client, stats, site_url, limit, kind).await;
        if urls.is_empty() {
            continue;
        }

        let total = urls.len();
        if limit > 0 && urls.len() > limit {
            urls.truncate(limit);
        }
        info!(
            "Extracted {} URLs from {} via {:?} ({} found)",
            urls.len(),
            site_url,
            kind,
            total
        );
        return Ok(ExtractionResult { urls, source: kind, total });
    }

    Err(HarvestError::NoSourceFound(site_url.to_string()))
}
