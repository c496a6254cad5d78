//! Batch processing over a list of sites.
//!
//! Sites are processed strictly sequentially in input order. Each site is
//! sanitized, then run through the operations the caller's flags select:
//! ad-tag scraping, bot-wall checking, or extraction plus optional validity
//! checking. One bad site never aborts the batch; its failure is recorded in
//! the report and the loop moves on.
//!
//! Counter semantics: `processed_sites` counts sites whose URL sanitized
//! successfully (an invalid URL is a failure but not a processed site);
//! `successful_sites` plus `failed_sites` covers every input site.

use std::time::{Duration, Instant};

use log::{info, warn};
use reqwest::Client;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::adsense::{self, AdTagRecord};
use crate::app::url::sanitize_site_url;
use crate::botwall::{self, BotWallVerdict};
use crate::error_handling::{update_error_stats, ProcessingStats};
use crate::extract::{self, SourceKind, SourcePriority};
use crate::validity;

/// Caller-selected behavior for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Per-site URL cap; 0 means unlimited.
    pub limit: usize,
    pub check_validity: bool,
    pub check_adsense: bool,
    /// Bot-wall checking replaces extraction entirely for every site.
    pub check_captcha: bool,
    pub priority: SourcePriority,
    /// Overall batch budget; sites not reached in time are recorded as
    /// failures. `None` means the batch runs to completion.
    pub deadline: Option<Duration>,
    /// User agent handed to the headless browser for bot-wall checks.
    pub user_agent: String,
}

/// Per-site outcome: a populated detail record or an error message.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SiteOutcome {
    #[serde(rename_all = "camelCase")]
    Success {
        total_urls: usize,
        valid_urls: usize,
        invalid_urls: usize,
        urls: Vec<String>,
        source: SourceKind,
    },
    Failure { error: String },
}

/// Site-to-outcome mapping preserving input order.
///
/// Serialized as a JSON object; a plain `HashMap` would scramble the order,
/// so the pairs are kept in a vector and serialized as a map by hand.
#[derive(Debug, Default)]
pub struct SiteResults(Vec<(String, SiteOutcome)>);

impl SiteResults {
    pub fn push(&mut self, site: String, outcome: SiteOutcome) {
        self.0.push((site, outcome));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, site: &str) -> Option<&SiteOutcome> {
        self.0
            .iter()
            .find(|(name, _)| name == site)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, SiteOutcome)> {
        self.0.iter()
    }
}

impl Serialize for SiteResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (site, outcome) in &self.0 {
            map.serialize_entry(site, outcome)?;
        }
        map.end()
    }
}

/// The aggregate result of one batch run.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total_sites: usize,
    pub processed_sites: usize,
    pub successful_sites: usize,
    pub failed_sites: usize,
    pub total_urls: usize,
    pub valid_urls: usize,
    pub invalid_urls: usize,
    pub all_urls: Vec<String>,
    pub site_results: SiteResults,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adsense_results: Option<Vec<AdTagRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_results: Option<Vec<BotWallVerdict>>,
}

impl BatchReport {
    fn record_failure(&mut self, site: String, error: String) {
        self.failed_sites += 1;
        self.site_results.push(site, SiteOutcome::Failure { error });
    }
}

/// Runs a batch over the given sites.
///
/// Sites are the raw caller-supplied strings; each is sanitized here, and
/// the report keys outcomes by the sanitized URL (or the raw string when
/// sanitization failed).
pub async fn run_batch(
    client: &Client,
    stats: &ProcessingStats,
    sites: &[String],
    options: &BatchOptions,
) -> BatchReport {
    let started = Instant::now();
    let mut report = BatchReport {
        total_sites: sites.len(),
        adsense_results: options.check_adsense.then(Vec::new),
        captcha_results: options.check_captcha.then(Vec::new),
        ..Default::default()
    };

    for raw_site in sites {
        let site = match sanitize_site_url(raw_site) {
            Some(site) => site,
            None => {
                warn!("Invalid URL format: {raw_site}");
                stats.increment(crate::error_handling::ErrorType::InvalidUrl);
                report.record_failure(raw_site.clone(), "Invalid URL format".to_string());
                continue;
            }
        };
        report.processed_sites += 1;

        if let Some(deadline) = options.deadline {
            if started.elapsed() > deadline {
                warn!("Batch deadline exceeded; skipping {site}");
                report.record_failure(site, "Batch deadline exceeded".to_string());
                continue;
            }
        }

        info!("Processing site: {site}");

        if options.check_adsense {
            let record = adsense::scrape_site(client, stats, &site).await;
            if let Some(results) = report.adsense_results.as_mut() {
                results.push(record);
            }
        }

        if options.check_captcha {
            // Bot-wall mode replaces extraction for this site.
            let verdict = botwall::check_bot_wall(&site, &options.user_agent).await;
            if let Some(results) = report.captcha_results.as_mut() {
                results.push(verdict);
            }
            report.successful_sites += 1;
            report.site_results.push(
                site,
                SiteOutcome::Success {
                    total_urls: 0,
                    valid_urls: 0,
                    invalid_urls: 0,
                    urls: Vec::new(),
                    source: SourceKind::Unknown,
                },
            );
            continue;
        }

        match extract::extract(client, stats, &site, options.limit, options.priority).await {
            Ok(result) => {
                let (urls, valid_count, invalid_count) = if options.check_validity {
                    let verdicts = validity::check_urls(client, stats, &result.urls).await;
                    let valid: Vec<String> = verdicts
                        .iter()
                        .filter(|verdict| verdict.valid)
                        .map(|verdict| verdict.url.clone())
                        .collect();
                    let valid_count = valid.len();
                    let invalid_count = verdicts.len() - valid_count;
                    (valid, valid_count, invalid_count)
                } else {
                    // Unchecked URLs count as valid.
                    let count = result.urls.len();
                    (result.urls.clone(), count, 0)
                };

                report.total_urls += result.urls.len();
                report.valid_urls += valid_count;
                report.invalid_urls += invalid_count;
                report.all_urls.extend(urls.iter().cloned());
                report.successful_sites += 1;
                report.site_results.push(
                    site,
                    SiteOutcome::Success {
                        total_urls: result.urls.len(),
                        valid_urls: valid_count,
                        invalid_urls: invalid_count,
                        urls,
                        source: result.source,
                    },
                );
            }
            Err(e) => {
                warn!("Extraction failed for {site}: {e}");
                update_error_stats(stats, &e);
                report.record_failure(site, e.to_string());
            }
        }
    }

    info!(
        "Batch complete: {} processed, {} succeeded, {} failed, {} URLs",
        report.processed_sites, report.successful_sites, report.failed_sites, report.total_urls
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_results_serializes_in_insertion_order() {
        let mut results = SiteResults::default();
        results.push(
            "https://zzz.example".to_string(),
            SiteOutcome::Failure { error: "x".to_string() },
        );
        results.push(
            "https://aaa.example".to_string(),
            SiteOutcome::Failure { error: "y".to_string() },
        );

        let json = serde_json::to_string(&results).unwrap();
        let zzz = json.find("zzz.example").unwrap();
        let aaa = json.find("aaa.example").unwrap();
        assert!(zzz < aaa, "input order must survive serialization");
    }

    #[test]
    fn test_success_outcome_shape() {
        let outcome = SiteOutcome::Success {
            total_urls: 2,
            valid_urls: 1,
            invalid_urls: 1,
            urls: vec!["https://example.com/a".to_string()],
            source: SourceKind::Sitemap,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["totalUrls"], 2);
        assert_eq!(json["validUrls"], 1);
        assert_eq!(json["invalidUrls"], 1);
        assert_eq!(json["source"], "sitemap");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failure_outcome_shape() {
        let outcome = SiteOutcome::Failure {
            error: "Could not find any sitemap or feed for https://x".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("error").is_some());
        assert!(json.get("urls").is_none());
    }

    #[test]
    fn test_report_omits_unrequested_enrichments() {
        let report = BatchReport {
            total_sites: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalSites"], 1);
        assert!(json.get("adsenseResults").is_none());
        assert!(json.get("captchaResults").is_none());
        assert!(json["siteResults"].is_object());
    }
}
