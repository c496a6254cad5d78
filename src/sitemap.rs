//! WordPress sitemap walking.
//!
//! Discovery order:
//! 1. Direct probe of `wp-sitemap-posts-post-1.xml`, then numbered pagination
//!    (`-post-2.xml`, `-post-3.xml`, …) until a probe fails, comes back
//!    empty, or the running total reaches the caller's limit.
//! 2. If the first probe fails entirely, three well-known index locations in
//!    order. Each is tried as an XML sitemap index (children filtered on
//!    "post"/"article" in the location, else the first three children), and
//!    when it is not a usable XML index, reinterpreted as HTML and scraped
//!    for sitemap links. The first index location that yields anything wins.
//!
//! Errors while walking an individual child sitemap are logged and swallowed;
//! they never abort the walk of the remaining children.

use log::{debug, info, warn};
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::config::{INDEX_FALLBACK_CHILD_COUNT, SITEMAP_INDEX_CANDIDATES};
use crate::error_handling::{update_error_stats, ProcessingStats};
use crate::transport::fetch_text;
use crate::xml::{self, SitemapIndex, UrlSet};

static SITEMAP_ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href*="sitemap"], a[href*=".xml"]"#)
        .expect("Failed to parse sitemap anchor selector - this is a bug")
});

/// Fetches a URL and decodes it as a leaf sitemap, returning its page URLs.
///
/// An empty list means the document decoded but carried no `<url>` entries
/// (wrong shape or a genuinely empty sitemap).
async fn fetch_leaf(client: &Client, sitemap_url: &str) -> Result<Vec<String>, crate::error_handling::HarvestError> {
    let body = fetch_text(client, sitemap_url).await?;
    let doc: UrlSet = xml::decode(&body)?;
    Ok(xml::normalize(doc.urls)
        .into_iter()
        .map(|entry| entry.loc)
        .collect())
}

/// Walks a child sitemap, appending its URLs; failures are logged, not raised.
async fn walk_child(
    client: &Client,
    stats: &ProcessingStats,
    child_url: &str,
    collected: &mut Vec<String>,
) {
    match fetch_leaf(client, child_url).await {
        Ok(urls) => {
            info!("Found {} URLs in sitemap {}", urls.len(), child_url);
            collected.extend(urls);
        }
        Err(e) => {
            warn!("Error processing sitemap {child_url}: {e}");
            update_error_stats(stats, &e);
        }
    }
}

/// Scrapes a non-XML index body as HTML, collecting candidate sitemap links
/// resolved against the base URL.
fn scrape_sitemap_links(body: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    document
        .select(&SITEMAP_ANCHOR_SELECTOR)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.contains(".xml"))
        .filter_map(|href| {
            if href.starts_with("http") {
                Some(href.to_string())
            } else {
                Url::parse(base_url)
                    .and_then(|base| base.join(href))
                    .map(|joined| joined.to_string())
                    .ok()
            }
        })
        .collect()
}

/// Walks an index location already fetched as `body`.
///
/// Returns `None` when the body is neither a usable XML index nor an HTML
/// page with sitemap links (the caller moves to the next candidate).
async fn walk_index_body(
    client: &Client,
    stats: &ProcessingStats,
    body: &str,
    base_url: &str,
    limit: usize,
) -> Option<Vec<String>> {
    let children = match xml::decode::<SitemapIndex>(body) {
        Ok(index) => xml::normalize(index.sitemaps),
        Err(decode_err) => {
            debug!("Index at {base_url} is not XML ({decode_err})");
            Vec::new()
        }
    };

    if children.is_empty() {
        // Not a usable XML index (malformed, or well-formed markup with no
        // <sitemap> children); reinterpret the body as HTML.
        let links = scrape_sitemap_links(body, base_url);
        if links.is_empty() {
            return None;
        }
        info!("Found {} potential sitemap links in HTML", links.len());

        let mut collected = Vec::new();
        for link in links {
            if limit > 0 && collected.len() >= limit {
                break;
            }
            walk_child(client, stats, &link, &mut collected).await;
        }
        return Some(collected);
    }

    let mut collected = Vec::new();

    let post_children: Vec<&str> = children
        .iter()
        .map(|child| child.loc.as_str())
        .filter(|loc| loc.contains("post") || loc.contains("article"))
        .collect();
    info!("Found {} post sitemaps in index", post_children.len());

    if post_children.is_empty() {
        // Breadth-limited fallback: first few children only.
        for child in children.iter().take(INDEX_FALLBACK_CHILD_COUNT) {
            if limit > 0 && collected.len() >= limit {
                break;
            }
            walk_child(client, stats, &child.loc, &mut collected).await;
        }
    } else {
        for loc in post_children {
            if limit > 0 && collected.len() >= limit {
                break;
            }
            walk_child(client, stats, loc, &mut collected).await;
        }
    }

    Some(collected)
}

/// Walks a site's sitemaps, returning discovered page URLs in discovery
/// order.
///
/// The list is uncapped (pagination merely stops once `limit` is reached, so
/// the final page may overshoot); truncation is the orchestrator's job. An
/// empty list means no sitemap produced anything.
pub async fn walk(
    client: &Client,
    stats: &ProcessingStats,
    base_url: &str,
    limit: usize,
) -> Vec<String> {
    let mut all_urls: Vec<String> = Vec::new();

    // Direct approach first: wp-sitemap-posts-post-1.xml
    let direct_url = format!("{base_url}/wp-sitemap-posts-post-1.xml");
    debug!("Checking for sitemap at: {direct_url}");

    match fetch_leaf(client, &direct_url).await {
        Ok(urls) => {
            if !urls.is_empty() {
                info!("Found {} URLs in primary sitemap", urls.len());
                all_urls.extend(urls);

                if limit == 0 || all_urls.len() < limit {
                    let mut page = 2usize;
                    loop {
                        let page_url = format!("{base_url}/wp-sitemap-posts-post-{page}.xml");
                        debug!("Checking for additional sitemap: {page_url}");
                        match fetch_leaf(client, &page_url).await {
                            Ok(urls) if !urls.is_empty() => {
                                info!("Found {} URLs in additional sitemap #{page}", urls.len());
                                all_urls.extend(urls);
                                page += 1;
                                if limit > 0 && all_urls.len() >= limit {
                                    break;
                                }
                            }
                            Ok(_) => break,
                            Err(_) => break, // no more numbered sitemaps
                        }
                    }
                }
            }
            all_urls
        }
        Err(first_probe_err) => {
            // Direct probe failed entirely; look for a sitemap index.
            debug!("Primary sitemap not found ({first_probe_err}); trying index locations");
            update_error_stats(stats, &first_probe_err);

            for index_path in SITEMAP_INDEX_CANDIDATES {
                let index_url = format!("{base_url}{index_path}");
                debug!("Checking for sitemap index at: {index_url}");

                let body = match fetch_text(client, &index_url).await {
                    Ok(body) => body,
                    Err(_) => continue,
                };

                if let Some(urls) = walk_index_body(client, stats, &body, base_url, limit).await {
                    return urls;
                }
            }

            debug!("No sitemap index found for {base_url}");
            Vec::new()
        }
    }
}
