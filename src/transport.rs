//! Outbound HTTP operations.
//!
//! Two single-purpose operations sit here: a GET that returns the body text
//! and a HEAD that returns the status code for any status. No retries: a
//! failed attempt is final, and fallback between candidate paths is the
//! walkers' concern, not the transport's.

use log::debug;
use reqwest::Client;

use crate::error_handling::HarvestError;

/// Fetches a URL and returns its body as text.
///
/// A non-success status is an error here: the walkers expect strict success
/// from a GET, since a 404 on a candidate path means "try the next one".
///
/// # Errors
///
/// Returns `HarvestError::Fetch` naming the failed URL for timeouts, DNS or
/// TLS failures, connection refusals, and non-2xx statuses.
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, HarvestError> {
    debug!("GET {url}");
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|source| HarvestError::Fetch {
            url: url.to_string(),
            source,
        })?;

    response.text().await.map_err(|source| HarvestError::Fetch {
        url: url.to_string(),
        source,
    })
}

/// Issues a HEAD request and returns the response status code.
///
/// Accepts all status codes without raising; classifying the status is the
/// caller's job. Only a transport-level failure (timeout, DNS, refused
/// connection) is an error.
pub async fn head_status(client: &Client, url: &str) -> Result<u16, HarvestError> {
    debug!("HEAD {url}");
    let response = client
        .head(url)
        .send()
        .await
        .map_err(|source| HarvestError::Fetch {
            url: url.to_string(),
            source,
        })?;

    Ok(response.status().as_u16())
}
