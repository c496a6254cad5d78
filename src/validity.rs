//! URL validity checking.
//!
//! A HEAD probe per URL: 2xx statuses count as valid, anything else
//! (including transport failures, recorded as status 0) as invalid. Probes
//! never abort a batch; a failed probe is an invalid URL with its error
//! message attached.

use log::debug;
use reqwest::Client;
use serde::Serialize;

use crate::config::MAX_ERROR_MESSAGE_LENGTH;
use crate::error_handling::{
    clip_message, update_error_stats, ErrorType, HarvestError, ProcessingStats,
};
use crate::transport::head_status;

/// The verdict for one probed URL.
#[derive(Debug, Clone, Serialize)]
pub struct ValidityVerdict {
    pub url: String,
    /// HTTP status from the HEAD probe, 0 when the probe itself failed.
    pub status: u16,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn status_is_valid(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Probes a single URL with HEAD and classifies the result.
pub async fn check_url(client: &Client, stats: &ProcessingStats, url: &str) -> ValidityVerdict {
    match head_status(client, url).await {
        Ok(status) => {
            let valid = status_is_valid(status);
            debug!("HEAD {url} -> {status} ({})", if valid { "valid" } else { "invalid" });
            if !valid {
                stats.increment(ErrorType::HeadProbeError);
            }
            ValidityVerdict {
                url: url.to_string(),
                status,
                valid,
                error: None,
            }
        }
        Err(e) => {
            debug!("HEAD {url} failed: {e}");
            update_error_stats(stats, &e);
            let mut message = match &e {
                HarvestError::Fetch { source, .. } => source.to_string(),
                other => other.to_string(),
            };
            clip_message(&mut message, MAX_ERROR_MESSAGE_LENGTH);
            ValidityVerdict {
                url: url.to_string(),
                status: 0,
                valid: false,
                error: Some(message),
            }
        }
    }
}

/// Probes a list of URLs sequentially, preserving input order.
pub async fn check_urls(
    client: &Client,
    stats: &ProcessingStats,
    urls: &[String],
) -> Vec<ValidityVerdict> {
    let mut verdicts = Vec::with_capacity(urls.len());
    for url in urls {
        verdicts.push(check_url(client, stats, url).await);
    }
    verdicts
}
