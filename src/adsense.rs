//! AdSense ad-tag scraping.
//!
//! Fetches a site's homepage and pulls every AdSense publisher ID out of the
//! raw HTML: the `client=ca-pub-…` query parameter on the adsbygoogle loader
//! script, `data-ad-client` attributes on `<ins>` ad units, and
//! `google_ad_client` assignments in inline scripts. IDs are deduplicated
//! preserving first-seen order. A fetch failure yields an empty record, not
//! a batch error.

use log::{debug, info};
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use std::sync::LazyLock;

use crate::error_handling::{update_error_stats, ProcessingStats};
use crate::transport::fetch_text;

static AD_CLIENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // loader script: adsbygoogle.js?client=ca-pub-1234567890123456
        r#"adsbygoogle\.js\?client=(ca-pub-\d{10,32})"#,
        // ad unit: <ins class="adsbygoogle" data-ad-client="ca-pub-…">
        r#"data-ad-client\s*=\s*["'](ca-pub-\d{10,32})["']"#,
        // legacy inline config: google_ad_client = "ca-pub-…"
        r#"google_ad_client\s*[:=]\s*["'](ca-pub-\d{10,32})["']"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Failed to compile AdSense regex - this is a bug"))
    .collect()
});

/// Publisher IDs found on one site's homepage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdTagRecord {
    pub domain: String,
    pub adsense_codes: Vec<String>,
}

/// Extracts publisher IDs from raw HTML, deduplicated in first-seen order.
fn extract_ad_clients(body: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for pattern in AD_CLIENT_PATTERNS.iter() {
        for captures in pattern.captures_iter(body) {
            if let Some(code) = captures.get(1) {
                let code = code.as_str().to_string();
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
        }
    }
    codes
}

/// Scrapes a site's homepage for AdSense publisher IDs.
///
/// The record's `domain` is the sanitized site URL as given; a homepage
/// fetch failure is logged and produces an empty `adsense_codes` list.
pub async fn scrape_site(client: &Client, stats: &ProcessingStats, site_url: &str) -> AdTagRecord {
    let codes = match fetch_text(client, site_url).await {
        Ok(body) => extract_ad_clients(&body),
        Err(e) => {
            debug!("AdSense scrape failed for {site_url}: {e}");
            update_error_stats(stats, &e);
            Vec::new()
        }
    };

    info!("Found {} AdSense code(s) on {}", codes.len(), site_url);
    AdTagRecord {
        domain: site_url.to_string(),
        adsense_codes: codes,
    }
}
